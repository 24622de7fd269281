use std::sync::Arc;

use colored::Colorize;

use flb_bench::{BenchConfig, BenchRunner, RunSummary, TracingSink};
use flb_types::{Stamp, Topic};

use crate::cli::{Cli, Command, RunArgs, TopicArgs};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args).await,
        Command::Check(args) => cmd_check(args),
        Command::Topic(args) => cmd_topic(args),
    }
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = assemble_config(&args)?;
    config.validate()?;

    let report_path = config.report_path.clone();
    let topic_hex = config.topic().to_hex();
    let mut runner = BenchRunner::from_config(config, Arc::new(TracingSink))?;
    let summary = runner.run().await?;

    println!("{} {} rounds converged", "✓".green().bold(), summary.rounds.len());
    println!("  topic: {}", topic_hex.cyan());
    println!("  report: {}", report_path.display().to_string().bold());
    print_latencies(&summary);
    Ok(())
}

fn cmd_check(args: RunArgs) -> anyhow::Result<()> {
    let config = assemble_config(&args)?;
    config.validate()?;
    println!("{} configuration is valid", "✓".green().bold());
    print!("{}", toml::to_string_pretty(&redacted_for_echo(&config))?);
    Ok(())
}

/// Stamps are credentials; the echoed config keeps their count but not
/// their tokens.
fn redacted_for_echo(config: &BenchConfig) -> BenchConfig {
    let mut echo = config.clone();
    echo.stamps = echo.stamps.iter().map(|_| Stamp::new("<redacted>")).collect();
    echo
}

fn cmd_topic(args: TopicArgs) -> anyhow::Result<()> {
    println!("{}", Topic::from_seed(&args.seed).to_hex());
    Ok(())
}

fn print_latencies(summary: &RunSummary) {
    let Some(first) = summary.rounds.first() else { return };
    let means = summary.mean_latency_ms();
    for (score, mean) in first.readers.iter().zip(means) {
        println!("  {}: mean {} ms", score.node.yellow(), mean.to_string().bold());
    }
}

/// Layer the effective configuration: TOML file, then flags, then
/// environment variables (the deployment-time override) on top.
fn assemble_config(args: &RunArgs) -> anyhow::Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => BenchConfig::default(),
    };

    if !args.writers.is_empty() {
        config.writer_urls = args.writers.clone();
    }
    if !args.readers.is_empty() {
        config.reader_urls = args.readers.clone();
    }
    if !args.stamps.is_empty() {
        config.stamps = args.stamps.iter().cloned().map(Stamp::from).collect();
    }
    if let Some(updates) = args.updates {
        config.updates = updates;
    }
    if let Some(seed) = &args.topic_seed {
        config.topic_seed = seed.clone();
    }
    if let Some(secs) = args.sync_wait_secs {
        config.sync_wait_secs = secs;
    }
    if let Some(secs) = args.round_wait_secs {
        config.round_wait_secs = secs;
    }
    if let Some(ms) = args.poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    if let Some(trials) = args.tag_trials {
        config.tag_trials = trials;
    }
    if args.max_polls.is_some() {
        config.max_polls = args.max_polls;
    }
    if let Some(report) = &args.report {
        config.report_path = report.clone();
    }

    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut BenchConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

// The lookup is injectable so tests never touch process-global state.
fn apply_env_overrides_with(
    config: &mut BenchConfig,
    var: impl Fn(&str) -> Option<String>,
) {
    if let Some(writers) = var("FLB_WRITERS") {
        config.writer_urls = split_list(&writers);
    }
    if let Some(readers) = var("FLB_READERS") {
        config.reader_urls = split_list(&readers);
    }
    if let Some(stamps) = var("FLB_STAMPS") {
        config.stamps = split_list(&stamps).into_iter().map(Stamp::from).collect();
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
