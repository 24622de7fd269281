use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flb_types::{FeedIndex, Topic};

use crate::error::BenchResult;

/// One reader's score for a completed round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderScore {
    pub node: String,
    /// Index the reader last reported. `None` means it never observed the
    /// feed — only possible in a timed-out round.
    pub observed: Option<u64>,
    /// Time from the start of the read phase until the reader first
    /// reported the expected index.
    pub latency_ms: u64,
}

/// Report record for one benchmark round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub timestamp: DateTime<Utc>,
    pub topic: Topic,
    pub expected: FeedIndex,
    pub readers: Vec<ReaderScore>,
}

impl RoundRecord {
    /// The persisted form: one comma-separated line per round —
    /// `timestamp,topicHex,expectedIndex,<observed per reader>...,<latencyMs per reader>...`
    pub fn to_csv_line(&self) -> String {
        let mut fields = vec![
            self.timestamp.to_rfc3339(),
            self.topic.to_hex(),
            self.expected.value().to_string(),
        ];
        for score in &self.readers {
            fields.push(
                score
                    .observed
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "-1".into()),
            );
        }
        for score in &self.readers {
            fields.push(score.latency_ms.to_string());
        }
        fields.join(",")
    }

    /// Whether every reader reported the expected index.
    pub fn converged(&self) -> bool {
        self.readers
            .iter()
            .all(|s| s.observed == Some(self.expected.value()))
    }
}

/// Append-only writer for the per-round CSV report.
///
/// The report file is the only state the benchmark persists across
/// invocations; re-running appends to an existing file.
#[derive(Debug)]
pub struct ReportWriter {
    file: File,
}

impl ReportWriter {
    /// Open (or create) the report file for appending.
    pub fn open(path: &Path) -> BenchResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Append one round record as a single CSV line.
    pub fn append(&mut self, record: &RoundRecord) -> BenchResult<()> {
        writeln!(self.file, "{}", record.to_csv_line())?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expected: u64, observed: &[Option<u64>]) -> RoundRecord {
        RoundRecord {
            timestamp: DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            topic: Topic::zero(),
            expected: FeedIndex::new(expected),
            readers: observed
                .iter()
                .enumerate()
                .map(|(i, o)| ReaderScore {
                    node: format!("node-{i}"),
                    observed: *o,
                    latency_ms: 100 * (i as u64 + 1),
                })
                .collect(),
        }
    }

    #[test]
    fn csv_line_layout() {
        let r = record(3, &[Some(3), Some(3)]);
        let line = r.to_csv_line();
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 3 + 2 + 2);
        assert_eq!(fields[1], Topic::zero().to_hex());
        assert_eq!(fields[2], "3");
        assert_eq!(&fields[3..5], &["3", "3"]);
        assert_eq!(&fields[5..7], &["100", "200"]);
    }

    #[test]
    fn unobserved_reader_is_minus_one() {
        let r = record(0, &[Some(0), None]);
        assert!(r.to_csv_line().split(',').any(|f| f == "-1"));
        assert!(!r.converged());
    }

    #[test]
    fn converged_requires_all_readers() {
        assert!(record(2, &[Some(2), Some(2)]).converged());
        assert!(!record(2, &[Some(2), Some(1)]).converged());
    }

    #[test]
    fn writer_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let mut writer = ReportWriter::open(&path).unwrap();
        writer.append(&record(0, &[Some(0)])).unwrap();
        writer.append(&record(1, &[Some(1)])).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(",0,0,"));
        assert!(lines[1].contains(",1,1,"));
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        {
            let mut writer = ReportWriter::open(&path).unwrap();
            writer.append(&record(0, &[Some(0)])).unwrap();
        }
        {
            let mut writer = ReportWriter::open(&path).unwrap();
            writer.append(&record(1, &[Some(1)])).unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
