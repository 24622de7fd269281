use std::sync::Arc;

use tracing::info;

use flb_client::{HttpNode, StorageNode};
use flb_crypto::SigningKey;
use flb_feed::{FeedReader, FeedWriter};

use crate::config::BenchConfig;
use crate::error::BenchResult;
use crate::events::EventSink;
use crate::report::{ReportWriter, RoundRecord};
use crate::verifier::{ConvergenceVerifier, VerifierOptions};

/// Aggregate outcome of a benchmark run.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub rounds: Vec<RoundRecord>,
}

impl RunSummary {
    /// Mean convergence latency per reader node, in the order the readers
    /// were configured.
    pub fn mean_latency_ms(&self) -> Vec<u64> {
        if self.rounds.is_empty() {
            return Vec::new();
        }
        let readers = self.rounds[0].readers.len();
        (0..readers)
            .map(|i| {
                let total: u64 = self.rounds.iter().map(|r| r.readers[i].latency_ms).sum();
                total / self.rounds.len() as u64
            })
            .collect()
    }
}

/// Drives a full benchmark session: one verifier, one report file, a
/// configured number of rounds with a fixed wait between them.
pub struct BenchRunner {
    verifier: ConvergenceVerifier,
    report: ReportWriter,
    config: BenchConfig,
}

impl BenchRunner {
    /// Build a runner against real HTTP nodes. A fresh owner key is
    /// generated per session; the feed is identified by the configured
    /// topic and that key.
    pub fn from_config(config: BenchConfig, sink: Arc<dyn EventSink>) -> BenchResult<Self> {
        config.validate()?;
        let mut writer_nodes: Vec<Arc<dyn StorageNode>> = Vec::new();
        for url in &config.writer_urls {
            writer_nodes.push(Arc::new(HttpNode::new(url.clone())?));
        }
        let mut reader_nodes: Vec<Arc<dyn StorageNode>> = Vec::new();
        for url in &config.reader_urls {
            reader_nodes.push(Arc::new(HttpNode::new(url.clone())?));
        }
        let key = Arc::new(SigningKey::generate());
        Self::with_nodes(config, writer_nodes, reader_nodes, key, sink)
    }

    /// Build a runner over explicit node handles. Test seam: the CLI goes
    /// through [`from_config`](Self::from_config), tests inject
    /// [`MemoryNode`](flb_client::MemoryNode)s here.
    pub fn with_nodes(
        config: BenchConfig,
        writer_nodes: Vec<Arc<dyn StorageNode>>,
        reader_nodes: Vec<Arc<dyn StorageNode>>,
        key: Arc<SigningKey>,
        sink: Arc<dyn EventSink>,
    ) -> BenchResult<Self> {
        config.validate()?;
        let topic = config.topic();
        let owner = key.owner_id();

        let writers = writer_nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| FeedWriter::new(node, Arc::clone(&key), config.stamp_for(i), topic))
            .collect();
        let readers = reader_nodes
            .into_iter()
            .map(|node| FeedReader::new(node, owner, topic))
            .collect();

        let options = VerifierOptions {
            grace: config.grace(),
            poll_interval: config.poll_interval(),
            tag_trials: config.tag_trials,
            tag_poll_interval: config.tag_poll_interval(),
            max_polls: config.max_polls,
        };
        let verifier = ConvergenceVerifier::new(writers, readers, topic, options, sink);
        let report = ReportWriter::open(&config.report_path)?;
        Ok(Self {
            verifier,
            report,
            config,
        })
    }

    /// Run the whole session: manifest creation, then `updates` rounds,
    /// appending one report line per completed round.
    pub async fn run(&mut self) -> BenchResult<RunSummary> {
        self.verifier.prepare().await?;
        info!(
            topic = %self.config.topic().to_hex(),
            updates = self.config.updates,
            "benchmark session started"
        );

        let mut summary = RunSummary::default();
        for round in 0..self.config.updates {
            let record = self.verifier.run_round().await?;
            self.report.append(&record)?;
            summary.rounds.push(record);
            if round + 1 < self.config.updates {
                tokio::time::sleep(self.config.round_wait()).await;
            }
        }
        Ok(summary)
    }
}
