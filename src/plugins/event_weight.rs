// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::UnitError;
use crate::model::{Dataset, EventContext};
use crate::traits::{Capability, Decision, Unit, UnitRegistry};

/// Applies a per-event weight stored in the event record, e.g. the pileup
/// reweighting factor. Simulation only; recorded data is left unweighted.
#[derive(Debug, Clone)]
pub struct EventWeight {
    name: String,
    field: String,
    run: Option<bool>,
}

impl EventWeight {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            run: None,
        }
    }
}

impl Unit for EventWeight {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::EventWeight]
    }

    fn begin_run(&mut self, dataset: &Arc<Dataset>, _registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
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
        if !is_simulation {
            return Ok(Decision::Continue);
        }

        let weight = event
            .record()
            .weights
            .get(&self.field)
            .copied()
            .filter(|w| w.is_finite())
            .ok_or_else(|| UnitError::MissingEventData {
                unit: self.name.clone(),
                what: format!("weight '{}'", self.field),
            })?;

        event.apply_weight(weight);
        Ok(Decision::Continue)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventRecord;

    fn event_with_weight(weight: Option<f64>, is_simulation: bool) -> EventContext {
        let mut record = EventRecord::default();
        if let Some(weight) = weight {
            record.weights.insert("pileup".to_string(), weight);
        }
        EventContext::new(record, 0, is_simulation)
    }

    #[test]
    fn test_weight_applied_in_simulation() {
        let units: Vec<Box<dyn Unit>> = Vec::new();
        let registry = UnitRegistry::new(&units);
        let mut unit = EventWeight::new("PileUpWeight", "pileup");
        unit.begin_run(&Arc::new(Dataset::simulation("QCD", 1.0, 1)), &registry)
            .unwrap();

        let mut ctx = event_with_weight(Some(0.8), true);
        unit.process_event(&mut ctx, &registry).unwrap();
        assert_eq!(ctx.weight(), 0.8);

        let mut missing = event_with_weight(None, true);
        assert!(matches!(
            unit.process_event(&mut missing, &registry),
            Err(UnitError::MissingEventData { .. })
        ));
    }

    #[test]
    fn test_data_is_untouched() {
        let units: Vec<Box<dyn Unit>> = Vec::new();
        let registry = UnitRegistry::new(&units);
        let mut unit = EventWeight::new("PileUpWeight", "pileup");
        unit.begin_run(&Arc::new(Dataset::data("JetHT")), &registry).unwrap();

        let mut ctx = event_with_weight(None, false);
        assert_eq!(unit.process_event(&mut ctx, &registry).unwrap(), Decision::Continue);
        assert_eq!(ctx.weight(), 1.0);
    }
}
