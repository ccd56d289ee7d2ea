// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::{StoreError, UnitError};
use crate::io::{Column, OutputStore, TableSink};
use crate::model::{Dataset, EventContext};
use crate::traits::{Capability, Decision, OutputService, Unit, UnitKind, UnitRegistry};

/// Service that hands out output tables for the dataset being processed.
///
/// The store itself is shared by all clones; only the current dataset is
/// per-run state.
#[derive(Clone)]
pub struct TableService {
    name: String,
    store: Arc<dyn OutputStore>,
    dataset: Option<Arc<Dataset>>,
}

impl TableService {
    pub fn new(name: impl Into<String>, store: Arc<dyn OutputStore>) -> Self {
        Self {
            name: name.into(),
            store,
            dataset: None,
        }
    }
}

impl Unit for TableService {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Service
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::Output]
    }

    fn begin_run(&mut self, dataset: &Arc<Dataset>, _registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        self.dataset = Some(Arc::clone(dataset));
        Ok(())
    }

    fn process_event(
        &mut self,
        _event: &mut EventContext,
        _upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        Ok(Decision::Continue)
    }

    fn end_run(&mut self) -> Result<(), UnitError> {
        self.dataset = None;
        Ok(())
    }

    fn clone_unit(&self) -> Box<dyn Unit> {
        Box::new(Self {
            dataset: None,
            ..self.clone()
        })
    }

    fn as_output(&self) -> Option<&dyn OutputService> {
        Some(self)
    }
}

impl OutputService for TableService {
    fn open_table(&self, table: &str, columns: &[Column]) -> Result<Box<dyn TableSink>, StoreError> {
        let dataset = self.dataset.as_ref().ok_or(StoreError::NoActiveDataset)?;
        self.store.open_table(dataset, table, columns)
    }
}
