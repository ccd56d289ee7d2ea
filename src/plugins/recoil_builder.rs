// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Reconstruction of the recoil system of a multijet event.
//!
//! The recoil is the set of all jets other than the leading one with
//! `pt >= T`, where `T` is the builder's jet pt threshold. Three observables
//! decide whether the event is a balanced multijet topology:
//!
//! * `A = |p_lead + p_recoil| / (pt_lead + |p_recoil|)`, the relative
//!   transverse imbalance between the leading jet and the recoil
//! * `alpha = pt(recoil[1]) / pt_lead`, the relative pt of the
//!   second-hardest recoil jet, or 0 when the recoil has a single jet
//! * `beta`, the share of the recoil scalar pt carried by soft jets with
//!   `pt < beta_pt_fraction * pt_lead`
//!
//! The event is accepted iff `A <= max_a`, `alpha <= max_alpha` and
//! `beta <= max_beta`.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::consts::{DEFAULT_BETA_PT_FRACTION, DEFAULT_MAX_A, DEFAULT_MAX_ALPHA, DEFAULT_MAX_BETA};
use crate::errors::UnitError;
use crate::model::{Dataset, EventContext, Jet, Vector2};
use crate::observability::messages::unit::{EventRejected, UnitRunFinished};
use crate::observability::messages::StructuredLog;
use crate::traits::{Capability, Decision, RecoilProvider, Requirement, Unit, UnitRegistry};

fn default_max_a() -> f64 {
    DEFAULT_MAX_A
}

fn default_max_alpha() -> f64 {
    DEFAULT_MAX_ALPHA
}

fn default_max_beta() -> f64 {
    DEFAULT_MAX_BETA
}

/// Upper bounds on the balance observables.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BalanceSelection {
    #[serde(default = "default_max_a")]
    pub max_a: f64,
    #[serde(default = "default_max_alpha")]
    pub max_alpha: f64,
    #[serde(default = "default_max_beta")]
    pub max_beta: f64,
}

impl Default for BalanceSelection {
    fn default() -> Self {
        Self {
            max_a: DEFAULT_MAX_A,
            max_alpha: DEFAULT_MAX_ALPHA,
            max_beta: DEFAULT_MAX_BETA,
        }
    }
}

/// Parameters of one recoil builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoilConfig {
    /// Minimal pt of a jet to enter the recoil (GeV).
    pub jet_pt_threshold: f64,
    pub selection: BalanceSelection,
    /// Soft-jet threshold for `beta`, relative to the leading jet pt.
    pub beta_pt_fraction: f64,
}

impl RecoilConfig {
    pub fn new(jet_pt_threshold: f64) -> Self {
        Self {
            jet_pt_threshold,
            selection: BalanceSelection::default(),
            beta_pt_fraction: DEFAULT_BETA_PT_FRACTION,
        }
    }
}

/// Why the builder rejected an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoilRejection {
    NoJets,
    EmptyRecoil,
    /// A denominator vanished or an observable is not finite.
    Degenerate,
    Asymmetry,
    Alpha,
    Beta,
}

impl fmt::Display for RecoilRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RecoilRejection::NoJets => "no jets",
            RecoilRejection::EmptyRecoil => "no recoil jets above threshold",
            RecoilRejection::Degenerate => "degenerate kinematics",
            RecoilRejection::Asymmetry => "asymmetry A above limit",
            RecoilRejection::Alpha => "alpha above limit",
            RecoilRejection::Beta => "beta above limit",
        };
        write!(f, "{}", reason)
    }
}

/// Leading jet, recoil and balance observables of an accepted event.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoilResult {
    pub lead_jet: Jet,
    /// Recoil jets ordered by descending pt.
    pub recoil_jets: Vec<Jet>,
    /// Vector sum of the recoil jet momenta.
    pub recoil: Vector2,
    /// Scalar mean pt of the recoil jets.
    pub recoil_mean_pt: f64,
    pub a: f64,
    pub alpha: f64,
    pub beta: f64,
    pub met: Vector2,
}

impl RecoilResult {
    pub fn pt_lead(&self) -> f64 {
        self.lead_jet.pt
    }

    pub fn eta_lead(&self) -> f64 {
        self.lead_jet.eta
    }

    pub fn pt_recoil(&self) -> f64 {
        self.recoil.norm()
    }

    pub fn multiplicity(&self) -> usize {
        self.recoil_jets.len()
    }
}

/// Build the recoil from jets sorted by descending pt.
pub fn build_recoil(jets: &[Jet], met: Vector2, config: &RecoilConfig) -> Result<RecoilResult, RecoilRejection> {
    let (lead, rest) = jets.split_first().ok_or(RecoilRejection::NoJets)?;

    let recoil_jets: Vec<Jet> = rest
        .iter()
        .filter(|jet| jet.pt >= config.jet_pt_threshold)
        .cloned()
        .collect();
    if recoil_jets.is_empty() {
        return Err(RecoilRejection::EmptyRecoil);
    }

    let pt_lead = lead.pt;
    let sum_pt: f64 = recoil_jets.iter().map(|jet| jet.pt).sum();
    if !(pt_lead > 0.0 && sum_pt > 0.0) {
        return Err(RecoilRejection::Degenerate);
    }

    let recoil = recoil_jets
        .iter()
        .fold(Vector2::ZERO, |sum, jet| sum + jet.pt_vec());
    let a = (lead.pt_vec() + recoil).norm() / (pt_lead + recoil.norm());
    let alpha = recoil_jets.get(1).map_or(0.0, |jet| jet.pt / pt_lead);

    let soft_threshold = config.beta_pt_fraction * pt_lead;
    let soft_pt: f64 = recoil_jets
        .iter()
        .map(|jet| jet.pt)
        .filter(|&pt| pt < soft_threshold)
        .sum();
    let beta = soft_pt / sum_pt;

    let recoil_mean_pt = sum_pt / recoil_jets.len() as f64;
    if ![a, alpha, beta, recoil_mean_pt].iter().all(|v| v.is_finite()) {
        return Err(RecoilRejection::Degenerate);
    }

    let selection = &config.selection;
    if a > selection.max_a {
        return Err(RecoilRejection::Asymmetry);
    }
    if alpha > selection.max_alpha {
        return Err(RecoilRejection::Alpha);
    }
    if beta > selection.max_beta {
        return Err(RecoilRejection::Beta);
    }

    Ok(RecoilResult {
        lead_jet: lead.clone(),
        recoil_jets,
        recoil,
        recoil_mean_pt,
        a,
        alpha,
        beta,
        met,
    })
}

#[derive(Debug, Clone, Default)]
struct BuilderRun {
    result: Option<RecoilResult>,
    events_seen: u64,
    events_rejected: u64,
}

/// Plugin that builds the recoil of every event and rejects unbalanced ones.
///
/// The result of the last accepted event is exposed through
/// [`RecoilProvider`]; it is cleared at the start of every event so a
/// rejected event never leaves a stale recoil behind.
#[derive(Debug, Clone)]
pub struct RecoilBuilder {
    name: String,
    jet_met: String,
    config: RecoilConfig,
    run: Option<BuilderRun>,
}

impl RecoilBuilder {
    pub fn new(name: impl Into<String>, jet_met: impl Into<String>, config: RecoilConfig) -> Self {
        Self {
            name: name.into(),
            jet_met: jet_met.into(),
            config,
            run: None,
        }
    }

    pub fn config(&self) -> &RecoilConfig {
        &self.config
    }
}

impl Unit for RecoilBuilder {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::Recoil]
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::mandatory(&self.jet_met, Capability::JetMet)]
    }

    fn begin_run(&mut self, _dataset: &Arc<Dataset>, registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        registry.require(&self.name, &self.jet_met, Capability::JetMet)?;
        self.run = Some(BuilderRun::default());
        Ok(())
    }

    fn process_event(
        &mut self,
        event: &mut EventContext,
        _upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        let run = self.run.as_mut().ok_or_else(|| UnitError::NotStarted {
            unit: self.name.clone(),
        })?;
        run.events_seen += 1;

        match build_recoil(event.jets(), event.met(), &self.config) {
            Ok(result) => {
                run.result = Some(result);
                Ok(Decision::Continue)
            }
            Err(rejection) => {
                run.result = None;
                run.events_rejected += 1;
                let reason = rejection.to_string();
                EventRejected {
                    unit: &self.name,
                    event: event.index(),
                    reason: &reason,
                }
                .log();
                Ok(Decision::Reject)
            }
        }
    }

    fn end_run(&mut self) -> Result<(), UnitError> {
        if let Some(run) = self.run.take() {
            UnitRunFinished {
                unit: &self.name,
                events_seen: run.events_seen,
                events_rejected: run.events_rejected,
            }
            .log();
        }
        Ok(())
    }

    fn clone_unit(&self) -> Box<dyn Unit> {
        Box::new(Self {
            run: None,
            ..self.clone()
        })
    }

    fn as_recoil(&self) -> Option<&dyn RecoilProvider> {
        Some(self)
    }
}

impl RecoilProvider for RecoilBuilder {
    fn recoil(&self) -> Option<&RecoilResult> {
        self.run.as_ref().and_then(|run| run.result.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventRecord;
    use crate::plugins::JetMetReader;
    use std::f64::consts::PI;

    fn jets(specs: &[(f64, f64)]) -> Vec<Jet> {
        specs.iter().map(|&(pt, phi)| Jet::massless(pt, 0.0, phi)).collect()
    }

    #[test]
    fn test_back_to_back_dijet() {
        let result = build_recoil(&jets(&[(200.0, 0.0), (100.0, PI)]), Vector2::ZERO, &RecoilConfig::new(30.0))
            .unwrap();

        assert_eq!(result.multiplicity(), 1);
        assert!((result.pt_recoil() - 100.0).abs() < 1e-9);
        assert!((result.a - 100.0 / 300.0).abs() < 1e-9);
        assert_eq!(result.alpha, 0.0);
        assert_eq!(result.beta, 0.0);
        assert_eq!(result.recoil_mean_pt, 100.0);
    }

    #[test]
    fn test_rejections() {
        let config = RecoilConfig::new(30.0);

        let test_cases = vec![
            (jets(&[]), RecoilRejection::NoJets),
            (jets(&[(200.0, 0.0)]), RecoilRejection::EmptyRecoil),
            (jets(&[(200.0, 0.0), (20.0, PI)]), RecoilRejection::EmptyRecoil),
            // Leading and recoil jet on the same side.
            (jets(&[(200.0, 0.0), (100.0, 0.0)]), RecoilRejection::Asymmetry),
            // Three comparable jets: second recoil jet is too hard.
            (
                jets(&[(150.0, 0.0), (145.0, 2.0 * PI / 3.0), (140.0, -2.0 * PI / 3.0)]),
                RecoilRejection::Alpha,
            ),
        ];

        for (input, expected) in test_cases {
            let result = build_recoil(&input, Vector2::ZERO, &config);
            assert_eq!(result.err(), Some(expected), "jets {:?}", input);
        }
    }

    #[test]
    fn test_beta_counts_soft_recoil_jets() {
        let mut config = RecoilConfig::new(5.0);
        config.selection.max_alpha = 1.0;
        config.selection.max_a = 1.0;

        // Soft threshold is 0.05 * 400 = 20 GeV.
        let input = jets(&[(400.0, 0.0), (300.0, PI), (60.0, PI), (10.0, PI), (10.0, PI)]);
        let result = build_recoil(&input, Vector2::ZERO, &config).unwrap();
        assert!((result.beta - 20.0 / 380.0).abs() < 1e-12);

        config.selection.max_beta = 0.05;
        assert_eq!(
            build_recoil(&input, Vector2::ZERO, &config).err(),
            Some(RecoilRejection::Beta)
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let result = build_recoil(&jets(&[(200.0, 0.0), (30.0, PI)]), Vector2::ZERO, &RecoilConfig::new(30.0));
        assert!(result.is_err_and(|e| e == RecoilRejection::Asymmetry));

        let mut config = RecoilConfig::new(30.0);
        config.selection.max_a = 1.0;
        let result = build_recoil(&jets(&[(200.0, 0.0), (30.0, PI)]), Vector2::ZERO, &config).unwrap();
        assert_eq!(result.multiplicity(), 1);
    }

    #[test]
    fn test_degenerate_leading_jet() {
        let result = build_recoil(&jets(&[(0.0, 0.0), (0.0, PI)]), Vector2::ZERO, &RecoilConfig::new(0.0));
        assert_eq!(result.err(), Some(RecoilRejection::Degenerate));
    }

    #[test]
    fn test_result_cleared_on_rejection() {
        let upstream: Vec<Box<dyn Unit>> = vec![Box::new(JetMetReader::new("JetMET"))];
        let registry = UnitRegistry::new(&upstream);
        let mut builder = RecoilBuilder::new("RecoilBuilderPt30", "JetMET", RecoilConfig::new(30.0));
        builder
            .begin_run(&Arc::new(Dataset::data("JetHT")), &registry)
            .unwrap();

        let mut accepted = EventContext::new(EventRecord::default(), 0, false);
        accepted.set_jets(jets(&[(200.0, 0.0), (100.0, PI)]));
        assert_eq!(builder.process_event(&mut accepted, &registry).unwrap(), Decision::Continue);
        assert!(builder.recoil().is_some());

        let mut rejected = EventContext::new(EventRecord::default(), 1, false);
        rejected.set_jets(jets(&[(200.0, 0.0)]));
        assert_eq!(builder.process_event(&mut rejected, &registry).unwrap(), Decision::Reject);
        assert!(builder.recoil().is_none());
    }

    #[test]
    fn test_clone_starts_fresh() {
        let upstream: Vec<Box<dyn Unit>> = vec![Box::new(JetMetReader::new("JetMET"))];
        let registry = UnitRegistry::new(&upstream);
        let mut builder = RecoilBuilder::new("RecoilBuilderPt30", "JetMET", RecoilConfig::new(30.0));
        builder
            .begin_run(&Arc::new(Dataset::data("JetHT")), &registry)
            .unwrap();
        let mut event = EventContext::new(EventRecord::default(), 0, false);
        event.set_jets(jets(&[(200.0, 0.0), (100.0, PI)]));
        builder.process_event(&mut event, &registry).unwrap();

        let clone = builder.clone_unit();
        assert_eq!(clone.name(), "RecoilBuilderPt30");
        assert!(clone.as_recoil().unwrap().recoil().is_none());
        assert!(builder.recoil().is_some());
    }

    #[test]
    fn test_clones_run_independently() {
        let upstream: Vec<Box<dyn Unit>> = vec![Box::new(JetMetReader::new("JetMET"))];
        let registry = UnitRegistry::new(&upstream);
        let prototype = RecoilBuilder::new("RecoilBuilderPt30", "JetMET", RecoilConfig::new(30.0));

        let mut first = prototype.clone_unit();
        let mut second = prototype.clone_unit();
        first.begin_run(&Arc::new(Dataset::data("JetHT")), &registry).unwrap();
        second
            .begin_run(&Arc::new(Dataset::simulation("QCD", 1.0, 10)), &registry)
            .unwrap();

        let mut balanced = EventContext::new(EventRecord::default(), 0, false);
        balanced.set_jets(jets(&[(200.0, 0.0), (100.0, PI)]));
        assert_eq!(first.process_event(&mut balanced, &registry).unwrap(), Decision::Continue);

        let mut single = EventContext::new(EventRecord::default(), 0, true);
        single.set_jets(jets(&[(150.0, 0.0)]));
        assert_eq!(second.process_event(&mut single, &registry).unwrap(), Decision::Reject);

        let accepted = first.as_recoil().unwrap().recoil().unwrap();
        assert_eq!(accepted.pt_lead(), 200.0);
        assert!(second.as_recoil().unwrap().recoil().is_none());
        assert!(prototype.recoil().is_none());

        first.end_run().unwrap();
        let mut other = EventContext::new(EventRecord::default(), 1, true);
        other.set_jets(jets(&[(300.0, 0.0), (150.0, PI)]));
        assert_eq!(second.process_event(&mut other, &registry).unwrap(), Decision::Continue);
        assert_eq!(second.as_recoil().unwrap().recoil().unwrap().pt_lead(), 300.0);
    }
}
