// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde::Deserialize;

use crate::errors::UnitError;
use crate::model::{Dataset, EventContext};
use crate::traits::{Decision, Unit, UnitRegistry};

/// Side of the boundary run number that is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunSelection {
    /// Keep runs strictly below the boundary.
    Less,
    /// Keep runs at or above the boundary.
    GreaterEq,
}

/// Keeps events on one side of a boundary run number.
#[derive(Debug, Clone)]
pub struct RunFilter {
    name: String,
    selection: RunSelection,
    boundary: u32,
}

impl RunFilter {
    pub fn new(name: impl Into<String>, selection: RunSelection, boundary: u32) -> Self {
        Self {
            name: name.into(),
            selection,
            boundary,
        }
    }

    pub fn accepts(&self, run: u32) -> bool {
        match self.selection {
            RunSelection::Less => run < self.boundary,
            RunSelection::GreaterEq => run >= self.boundary,
        }
    }
}

impl Unit for RunFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin_run(&mut self, _dataset: &Arc<Dataset>, _registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        Ok(())
    }

    fn process_event(
        &mut self,
        event: &mut EventContext,
        _upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        if self.accepts(event.record().id.run) {
            Ok(Decision::Continue)
        } else {
            Ok(Decision::Reject)
        }
    }

    fn clone_unit(&self) -> Box<dyn Unit> {
        Box::new(self.clone())
    }
}
