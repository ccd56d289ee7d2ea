// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde::Deserialize;

use crate::errors::UnitError;
use crate::model::{Dataset, EventContext};
use crate::observability::messages::unit::EventRejected;
use crate::observability::messages::StructuredLog;
use crate::traits::{Capability, Decision, Requirement, Unit, UnitRegistry};

fn default_luminosity() -> f64 {
    1.0
}

/// Trigger path assigned to one trigger bin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriggerPath {
    pub name: String,
    /// Recorded luminosity of the path, used to weight simulation.
    #[serde(default = "default_luminosity")]
    pub luminosity: f64,
}

impl TriggerPath {
    pub fn new(name: impl Into<String>, luminosity: f64) -> Self {
        Self {
            name: name.into(),
            luminosity,
        }
    }

    /// True if `fired` is this path, optionally as `HLT_<name>_v<N>`.
    fn matches(&self, fired: &str) -> bool {
        if fired == self.name {
            return true;
        }
        fired
            .strip_prefix("HLT_")
            .and_then(|rest| rest.strip_prefix(self.name.as_str()))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("_v"))
    }
}

/// Requires the trigger path of the event's trigger bin.
///
/// Recorded data is kept only if that path fired. Simulation carries no
/// trigger decisions; every event is kept and weighted with the luminosity of
/// its path instead.
#[derive(Debug, Clone)]
pub struct TriggerFilter {
    name: String,
    trigger_bin: String,
    paths: Vec<TriggerPath>,
    run: Option<bool>,
}

impl TriggerFilter {
    pub fn new(name: impl Into<String>, trigger_bin: impl Into<String>, paths: Vec<TriggerPath>) -> Self {
        Self {
            name: name.into(),
            trigger_bin: trigger_bin.into(),
            paths,
            run: None,
        }
    }
}

impl Unit for TriggerFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::EventWeight]
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::mandatory(&self.trigger_bin, Capability::TriggerBin)]
    }

    fn begin_run(&mut self, dataset: &Arc<Dataset>, registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        registry.require(&self.name, &self.trigger_bin, Capability::TriggerBin)?;
        self.run = Some(dataset.is_simulation());
        Ok(())
    }

    fn process_event(
        &mut self,
        event: &mut EventContext,
        _upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        let is_simulation = self.run.ok_or_else(|| UnitError::NotStarted {
            unit: self.name.clone(),
        })?;

        let bin = event.trigger_bin().ok_or_else(|| UnitError::MissingEventData {
            unit: self.name.clone(),
            what: "trigger bin".to_string(),
        })?;

        let Some(path) = self.paths.get(usize::from(bin)) else {
            EventRejected {
                unit: &self.name,
                event: event.index(),
                reason: "no trigger path for bin",
            }
            .log();
            return Ok(Decision::Reject);
        };

        if is_simulation {
            event.apply_weight(path.luminosity);
            return Ok(Decision::Continue);
        }

        if event.record().triggers.iter().any(|fired| path.matches(fired)) {
            Ok(Decision::Continue)
        } else {
            EventRejected {
                unit: &self.name,
                event: event.index(),
                reason: "trigger path of bin did not fire",
            }
            .log();
            Ok(Decision::Reject)
        }
    }

    fn end_run(&mut self) -> Result<(), UnitError> {
        self.run = None;
        Ok(())
    }

    fn clone_unit(&self) -> Box<dyn Unit> {
        Box::new(Self {
            run: None,
            ..self.clone()
        })
    }
}
