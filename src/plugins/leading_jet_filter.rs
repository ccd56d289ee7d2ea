// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::UnitError;
use crate::model::{Dataset, EventContext};
use crate::observability::messages::unit::EventRejected;
use crate::observability::messages::StructuredLog;
use crate::traits::{Capability, Decision, Requirement, Unit, UnitRegistry};

/// Keeps events whose leading jet has `pt >= min_pt` and `|eta| < max_abs_eta`.
#[derive(Debug, Clone)]
pub struct LeadingJetFilter {
    name: String,
    jet_met: String,
    min_pt: f64,
    max_abs_eta: f64,
    started: bool,
}

impl LeadingJetFilter {
    pub fn new(name: impl Into<String>, jet_met: impl Into<String>, min_pt: f64, max_abs_eta: f64) -> Self {
        Self {
            name: name.into(),
            jet_met: jet_met.into(),
            min_pt,
            max_abs_eta,
            started: false,
        }
    }
}

impl Unit for LeadingJetFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::mandatory(&self.jet_met, Capability::JetMet)]
    }

    fn begin_run(&mut self, _dataset: &Arc<Dataset>, registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        registry.require(&self.name, &self.jet_met, Capability::JetMet)?;
        self.started = true;
        Ok(())
    }

    fn process_event(
        &mut self,
        event: &mut EventContext,
        _upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        if !self.started {
            return Err(UnitError::NotStarted {
                unit: self.name.clone(),
            });
        }

        let passes = event
            .jets()
            .first()
            .is_some_and(|lead| lead.pt >= self.min_pt && lead.eta.abs() < self.max_abs_eta);

        if passes {
            return Ok(Decision::Continue);
        }

        EventRejected {
            unit: &self.name,
            event: event.index(),
            reason: "leading jet outside acceptance",
        }
        .log();
        Ok(Decision::Reject)
    }

    fn end_run(&mut self) -> Result<(), UnitError> {
        self.started = false;
        Ok(())
    }

    fn clone_unit(&self) -> Box<dyn Unit> {
        Box::new(Self {
            started: false,
            ..self.clone()
        })
    }
}
