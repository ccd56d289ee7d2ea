// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Adapters for the external collaborators of the pipeline: where events are
//! read from and where output tables go.

pub mod source;
pub mod store;

pub use source::{EventSource, EventStream, JsonLinesSource, MemorySource};
pub use store::{Column, ColumnType, CsvStore, MemoryStore, OutputStore, Table, TableSink, Value};
