// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Columnar output stores.
//!
//! A store hands out one [`TableSink`] per (dataset, table). Rows are checked
//! against the schema given when the table was opened, so a writer cannot
//! silently drift from its declared columns.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::StoreError;
use crate::model::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    F32,
    U16,
    U32,
    U64,
}

impl ColumnType {
    fn name(&self) -> &'static str {
        match self {
            ColumnType::F32 => "float",
            ColumnType::U16 => "uint16",
            ColumnType::U32 => "uint32",
            ColumnType::U64 => "uint64",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    F32(f32),
    U16(u16),
    U32(u32),
    U64(u64),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::F32(_) => ColumnType::F32,
            Value::U16(_) => ColumnType::U16,
            Value::U32(_) => ColumnType::U32,
            Value::U64(_) => ColumnType::U64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::F32(v) => v as f64,
            Value::U16(v) => v as f64,
            Value::U32(v) => v as f64,
            Value::U64(v) => v as f64,
        }
    }

    fn render(&self) -> String {
        match self {
            Value::F32(v) => v.to_string(),
            Value::U16(v) => v.to_string(),
            Value::U32(v) => v.to_string(),
            Value::U64(v) => v.to_string(),
        }
    }
}

/// Append-only table opened for one dataset.
pub trait TableSink: Send {
    fn append(&mut self, row: Vec<Value>) -> Result<(), StoreError>;

    /// Flush and close the table.
    fn finish(self: Box<Self>) -> Result<(), StoreError>;
}

/// Destination of all output tables of a run. Shared by every worker.
pub trait OutputStore: Send + Sync {
    fn open_table(
        &self,
        dataset: &Dataset,
        table: &str,
        columns: &[Column],
    ) -> Result<Box<dyn TableSink>, StoreError>;
}

fn check_row(table: &str, columns: &[Column], row: &[Value]) -> Result<(), StoreError> {
    if row.len() != columns.len() {
        return Err(StoreError::ColumnCount {
            table: table.to_string(),
            expected: columns.len(),
            actual: row.len(),
        });
    }

    for (column, value) in columns.iter().zip(row) {
        if column.ty != value.column_type() {
            return Err(StoreError::ColumnType {
                table: table.to_string(),
                column: column.name.to_string(),
                expected: column.ty.name(),
                actual: value.column_type().name(),
            });
        }
    }

    Ok(())
}

/// A finished in-memory table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, converted to `f64`.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        Some(self.rows.iter().map(|row| row[index].as_f64()).collect())
    }
}

type TableKey = (String, String);

/// Keeps finished tables in memory, keyed by dataset and table name.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<BTreeMap<TableKey, Table>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, dataset: &str, table: &str) -> Option<Table> {
        let tables = self.tables.lock().ok()?;
        tables
            .get(&(dataset.to_string(), table.to_string()))
            .cloned()
    }

    /// `(dataset, table)` keys of every finished table, sorted.
    pub fn keys(&self) -> Vec<(String, String)> {
        match self.tables.lock() {
            Ok(tables) => tables.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl OutputStore for MemoryStore {
    fn open_table(
        &self,
        dataset: &Dataset,
        table: &str,
        columns: &[Column],
    ) -> Result<Box<dyn TableSink>, StoreError> {
        Ok(Box::new(MemorySink {
            key: (dataset.name().to_string(), table.to_string()),
            table: Table {
                name: table.to_string(),
                columns: columns.to_vec(),
                rows: Vec::new(),
            },
            tables: Arc::clone(&self.tables),
        }))
    }
}

struct MemorySink {
    key: TableKey,
    table: Table,
    tables: Arc<Mutex<BTreeMap<TableKey, Table>>>,
}

impl TableSink for MemorySink {
    fn append(&mut self, row: Vec<Value>) -> Result<(), StoreError> {
        check_row(&self.table.name, &self.table.columns, &row)?;
        self.table.rows.push(row);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<(), StoreError> {
        let MemorySink { key, table, tables } = *self;
        let mut tables = tables.lock().map_err(|_| StoreError::Poisoned)?;
        tables.insert(key, table);
        Ok(())
    }
}

/// Writes every table as `<directory>/<dataset>/<table>.csv` with a header row.
#[derive(Debug, Clone)]
pub struct CsvStore {
    directory: PathBuf,
}

impl CsvStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn table_path(&self, dataset: &str, table: &str) -> PathBuf {
        self.directory.join(dataset).join(format!("{}.csv", table))
    }
}

impl OutputStore for CsvStore {
    fn open_table(
        &self,
        dataset: &Dataset,
        table: &str,
        columns: &[Column],
    ) -> Result<Box<dyn TableSink>, StoreError> {
        let path = self.table_path(dataset.name(), table);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut writer = csv::Writer::from_path(&path).map_err(|source| StoreError::Csv {
            path: path.clone(),
            source,
        })?;
        writer
            .write_record(columns.iter().map(|c| c.name))
            .map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })?;

        Ok(Box::new(CsvSink {
            table: table.to_string(),
            columns: columns.to_vec(),
            path,
            writer,
        }))
    }
}

struct CsvSink {
    table: String,
    columns: Vec<Column>,
    path: PathBuf,
    writer: csv::Writer<fs::File>,
}

impl TableSink for CsvSink {
    fn append(&mut self, row: Vec<Value>) -> Result<(), StoreError> {
        check_row(&self.table, &self.columns, &row)?;
        self.writer
            .write_record(row.iter().map(Value::render))
            .map_err(|source| StoreError::Csv {
                path: self.path.clone(),
                source,
            })
    }

    fn finish(mut self: Box<Self>) -> Result<(), StoreError> {
        self.writer.flush().map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
