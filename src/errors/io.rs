// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the external collaborators: event sources and output stores.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no events are available for dataset '{dataset}'")]
    UnknownDataset { dataset: String },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed event at {}:{line}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table '{table}' expects {expected} columns, got {actual}")]
    ColumnCount {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("table '{table}' column '{column}' expects {expected}, got {actual}")]
    ColumnType {
        table: String,
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("output service used before begin_run")]
    NoActiveDataset,

    #[error("output store state is poisoned")]
    Poisoned,

    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
