// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{SourceError, UnitError, ValidationErrors};
use std::fmt;
use thiserror::Error;

/// Lifecycle stage in which a unit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BeginRun,
    ProcessEvent,
    EndRun,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::BeginRun => write!(f, "begin_run"),
            Stage::ProcessEvent => write!(f, "process_event"),
            Stage::EndRun => write!(f, "end_run"),
        }
    }
}

/// Failure that aborts the processing of a single dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset '{dataset}': unit '{unit}' failed in {stage}: {source}")]
    Unit {
        dataset: String,
        unit: String,
        stage: Stage,
        #[source]
        source: UnitError,
    },

    #[error("dataset '{dataset}': {source}")]
    Source {
        dataset: String,
        #[source]
        source: SourceError,
    },
}

/// Failure that aborts the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid unit configuration:\n{0}")]
    Configuration(ValidationErrors),

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("dataset worker failed: {0}")]
    Worker(String),
}
