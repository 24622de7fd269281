use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, info, warn};

use flb_types::FeedIndex;

/// Telemetry emitted by the convergence loop.
///
/// The loop reports through an injectable [`EventSink`] instead of writing
/// to the console directly, so its behavior is observable in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BenchEvent {
    RoundStarted {
        round: u64,
        expected: FeedIndex,
    },
    UpdateCommitted {
        node: String,
        index: FeedIndex,
        /// Whether the node resolved the publish as an existing commit.
        conflict: bool,
    },
    TagSynced {
        node: String,
        tag: u64,
        trials: u32,
    },
    GraceElapsed {
        waited: Duration,
    },
    ReaderObserved {
        node: String,
        /// `None` until the node has any data for the feed.
        observed: Option<FeedIndex>,
        latency: Duration,
    },
    Diverged {
        poll: u64,
        expected: FeedIndex,
    },
    /// A reader reported an index ahead of the expected sequence — a
    /// violation of the monotonic contract, surfaced but not fatal.
    IndexAnomaly {
        node: String,
        observed: FeedIndex,
        expected: FeedIndex,
    },
    Converged {
        round: u64,
        polls: u64,
    },
}

/// Destination for convergence-loop telemetry.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &BenchEvent);
}

/// Forwards events to the `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &BenchEvent) {
        match event {
            BenchEvent::RoundStarted { round, expected } => {
                info!(round, expected = expected.value(), "round started");
            }
            BenchEvent::UpdateCommitted { node, index, conflict } => {
                debug!(node, index = index.value(), conflict, "update committed");
            }
            BenchEvent::TagSynced { node, tag, trials } => {
                debug!(node, tag, trials, "chunks replicated");
            }
            BenchEvent::GraceElapsed { waited } => {
                debug!(waited_ms = waited.as_millis() as u64, "grace period elapsed");
            }
            BenchEvent::ReaderObserved { node, observed, latency } => {
                debug!(
                    node,
                    observed = observed.map(|i| i.value()),
                    latency_ms = latency.as_millis() as u64,
                    "reader polled"
                );
            }
            BenchEvent::Diverged { poll, expected } => {
                debug!(poll, expected = expected.value(), "readers diverged, re-polling");
            }
            BenchEvent::IndexAnomaly { node, observed, expected } => {
                warn!(
                    node,
                    observed = observed.value(),
                    expected = expected.value(),
                    "index ahead of expected sequence"
                );
            }
            BenchEvent::Converged { round, polls } => {
                info!(round, polls, "all readers converged");
            }
        }
    }
}

/// Collects events in memory. For tests and embedders that post-process
/// telemetry.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BenchEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<BenchEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }

    /// Number of emitted events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&BenchEvent) -> bool) -> usize {
        self.events
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|e| predicate(e))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &BenchEvent) {
        self.events.lock().expect("lock poisoned").push(event.clone());
    }
}
