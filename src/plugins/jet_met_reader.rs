// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde::Deserialize;

use crate::config::options::{SystKind, SystVariation};
use crate::errors::UnitError;
use crate::model::{Dataset, EventContext, EventRecord, Jet, Vector2};
use crate::observability::messages::unit::UnitRunStarted;
use crate::observability::messages::StructuredLog;
use crate::traits::{Capability, Decision, Unit, UnitRegistry};

fn default_max_abs_eta() -> f64 {
    f64::INFINITY
}

/// Kinematic and quality selection applied to jets after variations.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct JetSelection {
    #[serde(default)]
    pub min_pt: f64,
    #[serde(default = "default_max_abs_eta")]
    pub max_abs_eta: f64,
    #[serde(default)]
    pub require_id: bool,
}

impl Default for JetSelection {
    fn default() -> Self {
        Self {
            min_pt: 0.0,
            max_abs_eta: default_max_abs_eta(),
            require_id: false,
        }
    }
}

impl JetSelection {
    pub fn accepts(&self, jet: &Jet) -> bool {
        jet.pt >= self.min_pt && jet.eta.abs() < self.max_abs_eta && (!self.require_id || jet.passes_id)
    }
}

/// Reads jets and missing energy from the event record into the context.
///
/// In simulation the configured systematic variation is applied before the
/// selection: jet energy scale and resolution variations rescale each jet and
/// the change of the jet momenta is propagated to the missing energy; the
/// unclustered variation shifts the missing energy alone. Recorded data is
/// always read nominal.
#[derive(Debug, Clone)]
pub struct JetMetReader {
    name: String,
    selection: JetSelection,
    variation: SystVariation,
    run: Option<ReaderRun>,
}

#[derive(Debug, Clone, Copy)]
struct ReaderRun {
    apply_variation: bool,
}

impl JetMetReader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selection: JetSelection::default(),
            variation: SystVariation::None,
            run: None,
        }
    }

    pub fn with_selection(mut self, selection: JetSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_variation(mut self, variation: SystVariation) -> Self {
        self.variation = variation;
        self
    }

    fn vary(&self, jet: &Jet) -> Jet {
        let SystVariation::Shift { kind, direction } = self.variation else {
            return jet.clone();
        };

        let factor = match kind {
            SystKind::Jec => 1.0 + direction.sign() * jet.jec_uncertainty,
            SystKind::Jer => {
                let smear = if direction.sign() > 0.0 { jet.jer_up } else { jet.jer_down };
                smear.unwrap_or(1.0)
            }
            SystKind::MetUnclustered => 1.0,
        };

        jet.scaled(factor.max(0.0))
    }

    fn read(&self, record: &EventRecord, apply_variation: bool) -> (Vec<Jet>, Vector2) {
        let mut met = record.met;
        let mut jets = Vec::with_capacity(record.jets.len());

        for jet in &record.jets {
            let jet = if apply_variation {
                let varied = self.vary(jet);
                met -= varied.pt_vec() - jet.pt_vec();
                varied
            } else {
                jet.clone()
            };

            if self.selection.accepts(&jet) {
                jets.push(jet);
            }
        }

        if apply_variation {
            if let SystVariation::Shift {
                kind: SystKind::MetUnclustered,
                direction,
            } = self.variation
            {
                let shift = record.met_unclustered_shift.unwrap_or(Vector2::ZERO);
                met += shift.scaled(direction.sign());
            }
        }

        (jets, met)
    }
}

impl Unit for JetMetReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::JetMet]
    }

    fn begin_run(&mut self, dataset: &Arc<Dataset>, _registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        self.run = Some(ReaderRun {
            apply_variation: dataset.is_simulation(),
        });
        UnitRunStarted {
            unit: &self.name,
            dataset: dataset.name(),
        }
        .log();
        Ok(())
    }

    fn process_event(
        &mut self,
        event: &mut EventContext,
        _upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        let run = self.run.ok_or_else(|| UnitError::NotStarted {
            unit: self.name.clone(),
        })?;

        let (jets, met) = self.read(event.record(), run.apply_variation);
        event.set_jets(jets);
        event.set_met(met);
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

    fn record() -> EventRecord {
        let mut lead = Jet::massless(200.0, 0.5, 0.0);
        lead.jec_uncertainty = 0.1;
        lead.jer_up = Some(1.2);
        let mut sub = Jet::massless(50.0, -2.8, std::f64::consts::PI);
        sub.passes_id = false;

        EventRecord {
            jets: vec![sub, lead],
            met: Vector2::new(10.0, 0.0),
            met_unclustered_shift: Some(Vector2::new(0.0, 4.0)),
            ..EventRecord::default()
        }
    }

    fn run(reader: JetMetReader, is_simulation: bool) -> EventContext {
        let mut reader = reader;
        let dataset = if is_simulation {
            Arc::new(Dataset::simulation("QCD", 1.0, 1))
        } else {
            Arc::new(Dataset::data("JetHT"))
        };
        let units: Vec<Box<dyn Unit>> = Vec::new();
        let registry = UnitRegistry::new(&units);

        reader.begin_run(&dataset, &registry).unwrap();
        let mut event = EventContext::new(record(), 0, is_simulation);
        assert_eq!(reader.process_event(&mut event, &registry).unwrap(), Decision::Continue);
        event
    }

    #[test]
    fn test_nominal_read_sorts_jets() {
        let event = run(JetMetReader::new("JetMET"), false);
        let pts: Vec<f64> = event.jets().iter().map(|j| j.pt).collect();
        assert_eq!(pts, vec![200.0, 50.0]);
        assert_eq!(event.met(), Vector2::new(10.0, 0.0));
    }

    #[test]
    fn test_selection() {
        let test_cases = vec![
            (JetSelection { min_pt: 60.0, ..JetSelection::default() }, 1),
            (JetSelection { max_abs_eta: 2.4, ..JetSelection::default() }, 1),
            (JetSelection { require_id: true, ..JetSelection::default() }, 1),
            (JetSelection::default(), 2),
        ];

        for (selection, expected) in test_cases {
            let event = run(JetMetReader::new("JetMET").with_selection(selection.clone()), false);
            assert_eq!(event.jets().len(), expected, "selection {:?}", selection);
        }
    }

    #[test]
    fn test_jec_up_propagates_to_met() {
        let reader = JetMetReader::new("JetMET").with_variation("jec-up".parse().unwrap());
        let event = run(reader, true);

        assert!((event.jets()[0].pt - 220.0).abs() < 1e-9);
        // Leading jet along +x gained 20 GeV; MET loses the same.
        assert!((event.met().x - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_jer_without_factor_is_nominal() {
        let reader = JetMetReader::new("JetMET").with_variation("jer-down".parse().unwrap());
        let event = run(reader, true);

        assert_eq!(event.jets()[0].pt, 200.0);
        assert_eq!(event.jets()[1].pt, 50.0);
    }

    #[test]
    fn test_met_unclustered_shift() {
        let reader = JetMetReader::new("JetMET").with_variation("metuncl-down".parse().unwrap());
        let event = run(reader, true);

        assert!((event.met().y - (-4.0)).abs() < 1e-9);
        assert_eq!(event.jets()[0].pt, 200.0);
    }

    #[test]
    fn test_variation_ignored_for_data() {
        let reader = JetMetReader::new("JetMET").with_variation("jec-up".parse().unwrap());
        let event = run(reader, false);
        assert_eq!(event.jets()[0].pt, 200.0);
    }

    #[test]
    fn test_process_before_begin_run_fails() {
        let mut reader = JetMetReader::new("JetMET");
        let units: Vec<Box<dyn Unit>> = Vec::new();
        let mut event = EventContext::new(record(), 0, false);
        let result = reader.process_event(&mut event, &UnitRegistry::new(&units));
        assert!(matches!(result, Err(UnitError::NotStarted { .. })));
    }
}
