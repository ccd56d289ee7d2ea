// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::UnitError;
use crate::io::{Column, ColumnType, TableSink, Value};
use crate::model::{Dataset, EventContext};
use crate::observability::messages::unit::TableOpened;
use crate::observability::messages::StructuredLog;
use crate::traits::{Capability, Decision, Requirement, Unit, UnitRegistry};

pub const EVENT_ID_COLUMNS: [Column; 3] = [
    Column::new("run", ColumnType::U32),
    Column::new("lumi", ColumnType::U32),
    Column::new("event", ColumnType::U64),
];

/// Records the ID of every event that reaches it, in a table named after the
/// unit.
pub struct EventIdWriter {
    name: String,
    output: String,
    sink: Option<Box<dyn TableSink>>,
}

impl EventIdWriter {
    pub fn new(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            sink: None,
        }
    }
}

impl Unit for EventIdWriter {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::mandatory(&self.output, Capability::Output)]
    }

    fn begin_run(&mut self, _dataset: &Arc<Dataset>, registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        let output = registry.require(&self.name, &self.output, Capability::Output)?;
        let sink = registry
            .output(&self.name, output)?
            .open_table(&self.name, &EVENT_ID_COLUMNS)
            .map_err(|source| UnitError::Output {
                unit: self.name.clone(),
                source,
            })?;
        TableOpened {
            unit: &self.name,
            table: &self.name,
            column_count: EVENT_ID_COLUMNS.len(),
        }
        .log();
        self.sink = Some(sink);
        Ok(())
    }

    fn process_event(
        &mut self,
        event: &mut EventContext,
        _upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        let sink = self.sink.as_mut().ok_or_else(|| UnitError::NotStarted {
            unit: self.name.clone(),
        })?;

        let id = event.record().id;
        sink.append(vec![Value::U32(id.run), Value::U32(id.lumi), Value::U64(id.event)])
            .map_err(|source| UnitError::Output {
                unit: self.name.clone(),
                source,
            })?;
        Ok(Decision::Continue)
    }

    fn end_run(&mut self) -> Result<(), UnitError> {
        match self.sink.take() {
            Some(sink) => sink.finish().map_err(|source| UnitError::Output {
                unit: self.name.clone(),
                source,
            }),
            None => Ok(()),
        }
    }

    fn clone_unit(&self) -> Box<dyn Unit> {
        Box::new(Self::new(self.name.clone(), self.output.clone()))
    }
}
