// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-dataset counters and the run report built from them.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetStatus {
    Completed,
    /// Processing was abandoned; holds the error that caused it.
    Failed(String),
}

impl DatasetStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, DatasetStatus::Failed(_))
    }
}

/// How many events one unit rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRejections {
    pub unit: String,
    pub rejected: u64,
}

/// Outcome of processing one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub dataset: String,
    pub events_read: u64,
    /// Events that passed every unit of the chain.
    pub events_accepted: u64,
    /// One entry per plugin, in chain order.
    pub rejections: Vec<UnitRejections>,
    pub status: DatasetStatus,
    pub duration: Duration,
}

impl DatasetSummary {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            events_read: 0,
            events_accepted: 0,
            rejections: Vec::new(),
            status: DatasetStatus::Completed,
            duration: Duration::ZERO,
        }
    }

    pub fn rejected_by(&self, unit: &str) -> Option<u64> {
        self.rejections
            .iter()
            .find(|r| r.unit == unit)
            .map(|r| r.rejected)
    }
}

/// Summaries of every dataset of a run, in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub datasets: Vec<DatasetSummary>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn failed_count(&self) -> usize {
        self.datasets.iter().filter(|d| d.status.is_failed()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn events_read(&self) -> u64 {
        self.datasets.iter().map(|d| d.events_read).sum()
    }

    pub fn events_accepted(&self) -> u64 {
        self.datasets.iter().map(|d| d.events_accepted).sum()
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetSummary> {
        self.datasets.iter().find(|d| d.dataset == name)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run summary")?;
        writeln!(f, "═══════════")?;

        for summary in &self.datasets {
            let status = match &summary.status {
                DatasetStatus::Completed => "completed".to_string(),
                DatasetStatus::Failed(error) => format!("FAILED: {}", error),
            };
            writeln!(
                f,
                "{}: {} read, {} accepted, {:?} ({})",
                summary.dataset, summary.events_read, summary.events_accepted, summary.duration, status
            )?;
            for rejection in summary.rejections.iter().filter(|r| r.rejected > 0) {
                writeln!(f, "    {:<24} rejected {}", rejection.unit, rejection.rejected)?;
            }
        }

        write!(
            f,
            "Total: {} datasets ({} failed), {} of {} events accepted in {:?}",
            self.datasets.len(),
            self.failed_count(),
            self.events_accepted(),
            self.events_read(),
            self.duration
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, read: u64, accepted: u64, status: DatasetStatus) -> DatasetSummary {
        DatasetSummary {
            events_read: read,
            events_accepted: accepted,
            rejections: vec![
                UnitRejections {
                    unit: "TriggerBin".to_string(),
                    rejected: read - accepted,
                },
                UnitRejections {
                    unit: "RecoilBuilderPt30".to_string(),
                    rejected: 0,
                },
            ],
            status,
            ..DatasetSummary::new(name)
        }
    }

    #[test]
    fn test_totals_and_failures() {
        let run = RunSummary {
            datasets: vec![
                summary("QCD-Ht-700-1000", 10, 4, DatasetStatus::Completed),
                summary("QCD-Ht-1000-1500", 5, 0, DatasetStatus::Failed("boom".to_string())),
            ],
            duration: Duration::from_millis(12),
        };

        assert_eq!(run.events_read(), 15);
        assert_eq!(run.events_accepted(), 4);
        assert_eq!(run.failed_count(), 1);
        assert!(!run.is_success());
        assert_eq!(run.dataset("QCD-Ht-700-1000").and_then(|d| d.rejected_by("TriggerBin")), Some(6));
    }

    #[test]
    fn test_display_lists_only_rejecting_units() {
        let run = RunSummary {
            datasets: vec![summary("JetHT", 3, 1, DatasetStatus::Completed)],
            duration: Duration::ZERO,
        };
        let report = run.to_string();

        assert!(report.contains("JetHT: 3 read, 1 accepted"));
        assert!(report.contains("TriggerBin"));
        assert!(!report.contains("RecoilBuilderPt30"));
        assert!(report.ends_with("Total: 1 datasets (0 failed), 1 of 3 events accepted in 0ns"));
    }
}
