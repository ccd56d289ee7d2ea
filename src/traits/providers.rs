// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability interfaces through which units read each other.

use crate::errors::StoreError;
use crate::io::{Column, TableSink};
use crate::plugins::RecoilResult;

/// Read access to the recoil reconstructed for the current event.
pub trait RecoilProvider {
    /// `Some` only while the current event has been accepted by the builder.
    fn recoil(&self) -> Option<&RecoilResult>;
}

/// Per-run factory for output tables.
pub trait OutputService {
    /// Open a table for the dataset currently being processed.
    fn open_table(&self, table: &str, columns: &[Column]) -> Result<Box<dyn TableSink>, StoreError>;
}
