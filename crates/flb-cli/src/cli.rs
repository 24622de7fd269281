use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "flb",
    about = "Feed Latency Bench — measures feed update propagation across storage nodes",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the propagation benchmark
    Run(RunArgs),
    /// Validate the configuration and print its effective form
    Check(RunArgs),
    /// Print the topic a seed label derives to
    Topic(TopicArgs),
}

#[derive(Args, Default)]
pub struct RunArgs {
    /// TOML configuration file; flags and environment layer on top
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Writer node URL (repeatable); overridden by FLB_WRITERS
    #[arg(long = "writer")]
    pub writers: Vec<String>,

    /// Reader node URL (repeatable); overridden by FLB_READERS
    #[arg(long = "reader")]
    pub readers: Vec<String>,

    /// Postage stamp, one per writer or one shared (repeatable);
    /// overridden by FLB_STAMPS
    #[arg(long = "stamp")]
    pub stamps: Vec<String>,

    /// Number of feed updates to publish and verify
    #[arg(long)]
    pub updates: Option<u64>,

    /// Seed label the feed topic is derived from
    #[arg(long)]
    pub topic_seed: Option<String>,

    /// Replication grace period after each publish round, in seconds
    #[arg(long)]
    pub sync_wait_secs: Option<u64>,

    /// Wait between completed rounds, in seconds
    #[arg(long)]
    pub round_wait_secs: Option<u64>,

    /// Wait between convergence re-polls, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Sync-tag trial budget
    #[arg(long)]
    pub tag_trials: Option<u32>,

    /// Bound on convergence polls per round (unbounded when omitted)
    #[arg(long)]
    pub max_polls: Option<u64>,

    /// Report file to append round records to
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct TopicArgs {
    pub seed: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_nodes() {
        let cli = Cli::try_parse_from([
            "flb", "run", "--writer", "http://w:1633", "--reader", "http://r1:1633", "--reader",
            "http://r2:1633", "--stamp", "tok",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.writers, vec!["http://w:1633"]);
            assert_eq!(args.readers.len(), 2);
            assert_eq!(args.stamps, vec!["tok"]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_run_with_timing_flags() {
        let cli = Cli::try_parse_from([
            "flb",
            "run",
            "--updates",
            "5",
            "--sync-wait-secs",
            "3",
            "--poll-interval-ms",
            "250",
            "--max-polls",
            "40",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.updates, Some(5));
            assert_eq!(args.sync_wait_secs, Some(3));
            assert_eq!(args.poll_interval_ms, Some(250));
            assert_eq!(args.max_polls, Some(40));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn max_polls_defaults_to_unbounded() {
        let cli = Cli::try_parse_from(["flb", "run"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.max_polls, None);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_run_with_config_file() {
        let cli = Cli::try_parse_from(["flb", "run", "--config", "bench.toml"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("bench.toml")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["flb", "check", "--writer", "http://w"]).unwrap();
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn parse_topic() {
        let cli = Cli::try_parse_from(["flb", "topic", "my-seed"]).unwrap();
        if let Command::Topic(args) = cli.command {
            assert_eq!(args.seed, "my-seed");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["flb", "--verbose", "run"]).unwrap();
        assert!(cli.verbose);
    }
}
