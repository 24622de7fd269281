//! Convergence verifier for the Feed Latency Bench.
//!
//! Orchestrates the full measurement: publish a feed update to every
//! writer node, wait out replication (sync tags plus a fixed grace
//! period), then poll every reader node until all of them report the
//! expected index, scoring per-node latency. One CSV line is appended to
//! the report per completed round.

pub mod config;
pub mod error;
pub mod events;
pub mod monitor;
pub mod report;
pub mod runner;
pub mod verifier;

pub use config::BenchConfig;
pub use error::{BenchError, BenchResult};
pub use events::{BenchEvent, EventSink, RecordingSink, TracingSink};
pub use monitor::SyncMonitor;
pub use report::{ReaderScore, ReportWriter, RoundRecord};
pub use runner::{BenchRunner, RunSummary};
pub use verifier::{ConvergenceVerifier, VerifierOptions};
