// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::UnitError;
use crate::model::{Dataset, EventContext};
use crate::observability::messages::unit::EventRejected;
use crate::observability::messages::StructuredLog;
use crate::traits::{Capability, Decision, Requirement, Unit, UnitRegistry};

/// Assigns each event to a bin by the pt of its leading jet.
///
/// Bin `i` covers `[edges[i], edges[i + 1])`, the last bin is open-ended.
/// Events with no jets or a leading jet below the first edge are rejected.
#[derive(Debug, Clone)]
pub struct TriggerBin {
    name: String,
    jet_met: String,
    edges: Vec<f64>,
    started: bool,
}

impl TriggerBin {
    pub fn new(name: impl Into<String>, jet_met: impl Into<String>, edges: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            jet_met: jet_met.into(),
            edges,
            started: false,
        }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Index of the last edge not above `pt`.
    pub fn classify(&self, pt: f64) -> Option<u16> {
        self.edges
            .iter()
            .rposition(|&edge| pt >= edge)
            .and_then(|index| u16::try_from(index).ok())
    }
}

impl Unit for TriggerBin {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::TriggerBin]
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

        let bin = event.jets().first().and_then(|lead| self.classify(lead.pt));
        match bin {
            Some(bin) => {
                event.set_trigger_bin(bin);
                Ok(Decision::Continue)
            }
            None => {
                EventRejected {
                    unit: &self.name,
                    event: event.index(),
                    reason: "leading jet below the lowest trigger bin",
                }
                .log();
                Ok(Decision::Reject)
            }
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::DEFAULT_TRIGGER_BIN_EDGES;
    use crate::model::{EventRecord, Jet};
    use crate::plugins::JetMetReader;

    #[test]
    fn test_classify() {
        let unit = TriggerBin::new("TriggerBin", "JetMET", DEFAULT_TRIGGER_BIN_EDGES.to_vec());

        let test_cases = vec![
            (150.0, None),
            (200.0, Some(0)),
            (249.9, Some(0)),
            (250.0, Some(1)),
            (400.0, Some(3)),
            (510.0, Some(5)),
            (4000.0, Some(5)),
        ];

        for (pt, expected) in test_cases {
            assert_eq!(unit.classify(pt), expected, "pt {}", pt);
        }
    }

    #[test]
    fn test_requires_jet_met_upstream() {
        let mut unit = TriggerBin::new("TriggerBin", "JetMET", vec![200.0]);
        let empty: Vec<Box<dyn Unit>> = Vec::new();
        let dataset = Arc::new(Dataset::data("JetHT"));

        let result = unit.begin_run(&dataset, &UnitRegistry::new(&empty));
        assert!(matches!(result, Err(UnitError::MissingDependency { .. })));

        let upstream: Vec<Box<dyn Unit>> = vec![Box::new(JetMetReader::new("JetMET"))];
        unit.begin_run(&dataset, &UnitRegistry::new(&upstream)).unwrap();
    }

    #[test]
    fn test_sets_bin_or_rejects() {
        let mut unit = TriggerBin::new("TriggerBin", "JetMET", vec![200.0, 300.0]);
        let upstream: Vec<Box<dyn Unit>> = vec![Box::new(JetMetReader::new("JetMET"))];
        let registry = UnitRegistry::new(&upstream);
        unit.begin_run(&Arc::new(Dataset::data("JetHT")), &registry).unwrap();

        let mut event = EventContext::new(EventRecord::default(), 0, false);
        assert_eq!(unit.process_event(&mut event, &registry).unwrap(), Decision::Reject);

        event.set_jets(vec![Jet::massless(320.0, 0.0, 0.0)]);
        assert_eq!(unit.process_event(&mut event, &registry).unwrap(), Decision::Continue);
        assert_eq!(event.trigger_bin(), Some(1));
    }
}
