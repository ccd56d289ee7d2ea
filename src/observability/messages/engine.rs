// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the orchestrator lifecycle:
//! * Run start and completion
//! * Execution order resolution
//! * Per-dataset start, completion and failure

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Run started over a set of datasets.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunStarted {
    pub dataset_count: usize,
    pub unit_count: usize,
    pub worker_count: usize,
}

impl Display for RunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting run over {} datasets with {} units, workers={}",
            self.dataset_count, self.unit_count, self.worker_count
        )
    }
}

impl StructuredLog for RunStarted {
    fn log(&self) {
        tracing::info!(
            dataset_count = self.dataset_count,
            unit_count = self.unit_count,
            worker_count = self.worker_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            dataset_count = self.dataset_count,
            unit_count = self.unit_count,
            worker_count = self.worker_count,
        )
    }
}

/// Execution order of the unit chain resolved.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ExecutionOrderResolved<'a> {
    pub order: &'a [&'a str],
}

impl Display for ExecutionOrderResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Resolved execution order: {}", self.order.join(" -> "))
    }
}

impl StructuredLog for ExecutionOrderResolved<'_> {
    fn log(&self) {
        tracing::debug!(unit_count = self.order.len(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "execution_order",
            span_name = name,
            unit_count = self.order.len(),
        )
    }
}

/// A worker started processing a dataset.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DatasetStarted<'a> {
    pub dataset: &'a str,
    pub is_simulation: bool,
    pub unit_count: usize,
}

impl Display for DatasetStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let kind = if self.is_simulation { "simulation" } else { "data" };
        write!(
            f,
            "Processing {} dataset '{}' with {} units",
            kind, self.dataset, self.unit_count
        )
    }
}

impl StructuredLog for DatasetStarted<'_> {
    fn log(&self) {
        tracing::info!(
            dataset = self.dataset,
            is_simulation = self.is_simulation,
            unit_count = self.unit_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "dataset",
            span_name = name,
            dataset = self.dataset,
            is_simulation = self.is_simulation,
        )
    }
}

/// A dataset was processed to the end.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DatasetCompleted<'a> {
    pub dataset: &'a str,
    pub events_read: u64,
    pub events_accepted: u64,
    pub duration: Duration,
}

impl Display for DatasetCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dataset '{}' completed: {} of {} events accepted in {:?}",
            self.dataset, self.events_accepted, self.events_read, self.duration
        )
    }
}

impl StructuredLog for DatasetCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            dataset = self.dataset,
            events_read = self.events_read,
            events_accepted = self.events_accepted,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "dataset_completed",
            span_name = name,
            dataset = self.dataset,
            events_read = self.events_read,
            events_accepted = self.events_accepted,
        )
    }
}

/// A dataset was abandoned after an error. Other datasets carry on.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DatasetFailed<'a> {
    pub dataset: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DatasetFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dataset '{}' failed: {}", self.dataset, self.error)
    }
}

impl StructuredLog for DatasetFailed<'_> {
    fn log(&self) {
        tracing::error!(
            dataset = self.dataset,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "dataset_failed",
            span_name = name,
            dataset = self.dataset,
            error = %self.error,
        )
    }
}

/// All dataset workers finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunCompleted {
    pub dataset_count: usize,
    pub failed_count: usize,
    pub duration: Duration,
}

impl Display for RunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run completed: {} datasets, {} failed, in {:?}",
            self.dataset_count, self.failed_count, self.duration
        )
    }
}

impl StructuredLog for RunCompleted {
    fn log(&self) {
        if self.failed_count > 0 {
            tracing::warn!(
                dataset_count = self.dataset_count,
                failed_count = self.failed_count,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::info!(
                dataset_count = self.dataset_count,
                failed_count = self.failed_count,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            dataset_count = self.dataset_count,
            failed_count = self.failed_count,
        )
    }
}
