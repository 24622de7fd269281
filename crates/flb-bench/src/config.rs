use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use flb_types::{Stamp, Topic};

use crate::error::{BenchError, BenchResult};

/// Complete configuration of one benchmark run.
///
/// Loadable from TOML; the CLI layers flags and environment overrides on
/// top of the file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Storage nodes updates are published to.
    pub writer_urls: Vec<String>,
    /// Storage nodes readers poll. Usually disjoint from the writers.
    pub reader_urls: Vec<String>,
    /// Postage stamps, one per writer node (or a single stamp shared by
    /// all writers).
    pub stamps: Vec<Stamp>,
    /// Number of benchmark rounds (one feed update each).
    pub updates: u64,
    /// Human label the feed topic is derived from. Empty → zero topic.
    pub topic_seed: String,
    /// Replication grace period after each publish round, in seconds.
    pub sync_wait_secs: u64,
    /// Wait between completed rounds, in seconds.
    pub round_wait_secs: u64,
    /// Wait between convergence re-polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Trial budget of the bounded sync-tag poll.
    pub tag_trials: u32,
    /// Wait between sync-tag trials, in milliseconds.
    pub tag_poll_interval_ms: u64,
    /// Optional bound on convergence polls per round. `None` preserves the
    /// original unbounded loop.
    pub max_polls: Option<u64>,
    /// Append-only CSV report file.
    pub report_path: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            writer_urls: Vec::new(),
            reader_urls: Vec::new(),
            stamps: Vec::new(),
            updates: 10,
            topic_seed: String::new(),
            sync_wait_secs: 5,
            round_wait_secs: 1,
            poll_interval_ms: 500,
            tag_trials: 30,
            tag_poll_interval_ms: 1000,
            max_polls: None,
            report_path: PathBuf::from("flb-report.csv"),
        }
    }
}

impl BenchConfig {
    /// Parse from a TOML document.
    pub fn from_toml_str(s: &str) -> BenchResult<Self> {
        toml::from_str(s).map_err(|e| BenchError::Config(e.to_string()))
    }

    /// Check the run is actually executable.
    pub fn validate(&self) -> BenchResult<()> {
        if self.writer_urls.is_empty() {
            return Err(BenchError::Config("no writer nodes configured".into()));
        }
        if self.reader_urls.is_empty() {
            return Err(BenchError::Config("no reader nodes configured".into()));
        }
        if self.stamps.is_empty() {
            return Err(BenchError::Config("no postage stamps configured".into()));
        }
        if self.stamps.len() != 1 && self.stamps.len() != self.writer_urls.len() {
            return Err(BenchError::Config(format!(
                "expected 1 or {} stamps, got {}",
                self.writer_urls.len(),
                self.stamps.len()
            )));
        }
        if self.updates == 0 {
            return Err(BenchError::Config("updates must be at least 1".into()));
        }
        Ok(())
    }

    /// The benchmark topic: derived from the seed, or all zeros when no
    /// seed is configured.
    pub fn topic(&self) -> Topic {
        if self.topic_seed.is_empty() {
            Topic::zero()
        } else {
            Topic::from_seed(&self.topic_seed)
        }
    }

    /// The stamp for the `i`-th writer node.
    pub fn stamp_for(&self, writer: usize) -> Stamp {
        if self.stamps.len() == 1 {
            self.stamps[0].clone()
        } else {
            self.stamps[writer].clone()
        }
    }

    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.sync_wait_secs)
    }

    pub fn round_wait(&self) -> Duration {
        Duration::from_secs(self.round_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn tag_poll_interval(&self) -> Duration {
        Duration::from_millis(self.tag_poll_interval_ms)
    }
}
