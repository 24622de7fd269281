use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::{join_all, try_join_all};
use tokio::time::Instant;
use tracing::warn;

use flb_feed::{FeedError, FeedReader, FeedWriter};
use flb_types::{ChunkRef, FeedIndex, FeedUpdate, Topic};

use crate::error::{BenchError, BenchResult};
use crate::events::{BenchEvent, EventSink};
use crate::monitor::SyncMonitor;
use crate::report::{ReaderScore, RoundRecord};

/// Timing knobs of the convergence loop.
#[derive(Clone, Copy, Debug)]
pub struct VerifierOptions {
    /// Unconditional wait after each publish round, modeling the time the
    /// network needs to replicate newly published chunks.
    pub grace: Duration,
    /// Wait between convergence re-polls.
    pub poll_interval: Duration,
    /// Sync-tag trial budget.
    pub tag_trials: u32,
    /// Wait between sync-tag trials.
    pub tag_poll_interval: Duration,
    /// Optional bound on convergence polls per round. `None` leaves the
    /// loop unbounded.
    pub max_polls: Option<u64>,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            poll_interval: Duration::from_millis(500),
            tag_trials: 30,
            tag_poll_interval: Duration::from_secs(1),
            max_polls: None,
        }
    }
}

/// Per-reader convergence state within one round.
struct ReaderSlot {
    reader: FeedReader,
    observed: Option<FeedIndex>,
    /// Time from the start of the read phase until the reader first
    /// reported the expected index. Cleared again if it regresses.
    converged_after: Option<Duration>,
}

/// The central control loop: publishes one update per round to every
/// writer node, waits out replication, then polls every reader node until
/// all of them report the expected index simultaneously.
///
/// Owns all mutable benchmark state — the round counter and the
/// incrementing payload buffer — and mutates it only between awaits, so
/// the loop is race-free on a single runtime without extra locking.
pub struct ConvergenceVerifier {
    writers: Vec<FeedWriter>,
    readers: Vec<ReaderSlot>,
    topic: Topic,
    options: VerifierOptions,
    monitor: SyncMonitor,
    sink: Arc<dyn EventSink>,
    payload: ChunkRef,
    round: u64,
}

impl ConvergenceVerifier {
    pub fn new(
        writers: Vec<FeedWriter>,
        readers: Vec<FeedReader>,
        topic: Topic,
        options: VerifierOptions,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let monitor = SyncMonitor::new(options.tag_trials, options.tag_poll_interval);
        Self {
            writers,
            readers: readers
                .into_iter()
                .map(|reader| ReaderSlot {
                    reader,
                    observed: None,
                    converged_after: None,
                })
                .collect(),
            topic,
            options,
            monitor,
            sink,
            payload: ChunkRef::zero(),
            round: 0,
        }
    }

    /// Create the feed manifest on every writer node. Called once per
    /// session, before the first round.
    pub async fn prepare(&self) -> BenchResult<()> {
        try_join_all(self.writers.iter().map(|w| w.create_manifest())).await?;
        Ok(())
    }

    /// Rounds completed so far.
    pub fn rounds_completed(&self) -> u64 {
        self.round
    }

    /// Run one benchmark round to convergence and score it.
    pub async fn run_round(&mut self) -> BenchResult<RoundRecord> {
        // A distinguishable payload per round: indices are the comparison
        // key, the payload only has to differ between rounds.
        self.payload.increment();
        let payload = self.payload;
        let (expected, tags) = self.publish_round(payload).await?;

        self.await_replication(&tags).await?;
        tokio::time::sleep(self.options.grace).await;
        self.sink.emit(&BenchEvent::GraceElapsed {
            waited: self.options.grace,
        });

        let record = self.poll_until_converged(expected).await?;
        self.round += 1;
        Ok(record)
    }

    /// Fan out one publish per writer node; the round is complete only once
    /// all have resolved. The first failure aborts the join and the run.
    async fn publish_round(
        &mut self,
        payload: ChunkRef,
    ) -> BenchResult<(FeedIndex, Vec<Option<u64>>)> {
        let expected = self
            .writers
            .first()
            .map(|w| w.next_index())
            .ok_or_else(|| BenchError::Config("no writers".into()))?;
        self.sink.emit(&BenchEvent::RoundStarted {
            round: self.round,
            expected,
        });

        let committed =
            try_join_all(self.writers.iter_mut().map(|w| w.publish(payload))).await?;

        for (writer, update) in self.writers.iter().zip(&committed) {
            self.sink.emit(&BenchEvent::UpdateCommitted {
                node: writer.node().label().to_string(),
                index: update.index,
                conflict: update.conflict,
            });
            // Writers are driven in lockstep by this loop; skew means a
            // writer was used outside of it.
            if update.index != expected {
                warn!(
                    node = writer.node().label(),
                    committed = update.index.value(),
                    expected = expected.value(),
                    "writer index out of lockstep"
                );
            }
        }
        let tags = committed.iter().map(|u| u.tag).collect();
        Ok((expected, tags))
    }

    /// Wait for the sync tag of every publish that uploaded new chunks.
    async fn await_replication(&self, tags: &[Option<u64>]) -> BenchResult<()> {
        for (writer, tag) in self.writers.iter().zip(tags) {
            // Conflict-resolved publishes carry no tag; nothing new was
            // uploaded, so there is no replication to wait for.
            let Some(tag) = *tag else { continue };
            let trials = self.monitor.wait_synced(writer.node().as_ref(), tag).await?;
            self.sink.emit(&BenchEvent::TagSynced {
                node: writer.node().label().to_string(),
                tag,
                trials,
            });
        }
        Ok(())
    }

    /// Poll all readers until every one of them reports `expected` in the
    /// same poll. Divergence is absorbed here, never raised.
    async fn poll_until_converged(&mut self, expected: FeedIndex) -> BenchResult<RoundRecord> {
        for slot in &mut self.readers {
            slot.observed = None;
            slot.converged_after = None;
        }

        let phase_start = Instant::now();
        let mut polls: u64 = 0;
        loop {
            polls += 1;
            let results = join_all(
                self.readers
                    .iter()
                    .map(|slot| Self::timed_download(&slot.reader)),
            )
            .await;

            for (slot, result) in self.readers.iter_mut().zip(results) {
                let (update, latency) = result?;
                let observed = update.map(|u| u.index);
                self.sink.emit(&BenchEvent::ReaderObserved {
                    node: slot.reader.node_label().to_string(),
                    observed,
                    latency,
                });
                if let Some(index) = observed {
                    if index > expected {
                        self.sink.emit(&BenchEvent::IndexAnomaly {
                            node: slot.reader.node_label().to_string(),
                            observed: index,
                            expected,
                        });
                    }
                }
                slot.observed = observed;
                match (observed == Some(expected), slot.converged_after) {
                    (true, None) => slot.converged_after = Some(phase_start.elapsed()),
                    (false, Some(_)) => slot.converged_after = None,
                    _ => {}
                }
            }

            if self.readers.iter().all(|s| s.observed == Some(expected)) {
                self.sink.emit(&BenchEvent::Converged {
                    round: self.round,
                    polls,
                });
                return Ok(self.score(expected));
            }

            self.sink.emit(&BenchEvent::Diverged { poll: polls, expected });
            if let Some(bound) = self.options.max_polls {
                if polls >= bound {
                    return Err(BenchError::ConvergenceTimeout { polls });
                }
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }

    /// One download with its latency. `NotFound` means "not yet observed";
    /// any other reader failure is fatal.
    async fn timed_download(
        reader: &FeedReader,
    ) -> Result<(Option<FeedUpdate>, Duration), FeedError> {
        let start = Instant::now();
        match reader.download().await {
            Ok(update) => Ok((Some(update), start.elapsed())),
            Err(FeedError::NotFound) => Ok((None, start.elapsed())),
            Err(other) => Err(other),
        }
    }

    fn score(&self, expected: FeedIndex) -> RoundRecord {
        RoundRecord {
            timestamp: Utc::now(),
            topic: self.topic,
            expected,
            readers: self
                .readers
                .iter()
                .map(|slot| ReaderScore {
                    node: slot.reader.node_label().to_string(),
                    observed: slot.observed.map(|i| i.value()),
                    latency_ms: slot
                        .converged_after
                        .unwrap_or_default()
                        .as_millis() as u64,
                })
                .collect(),
        }
    }
}
