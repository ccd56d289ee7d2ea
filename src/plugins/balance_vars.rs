// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-event balance observables written to one output table per pt cut.

use std::sync::Arc;

use serde::Deserialize;

use crate::errors::UnitError;
use crate::io::{Column, ColumnType, TableSink, Value};
use crate::model::{Dataset, EventContext};
use crate::observability::messages::unit::{EventRejected, TableOpened};
use crate::observability::messages::StructuredLog;
use crate::plugins::RecoilResult;
use crate::traits::{Capability, Decision, Requirement, Unit, UnitHandle, UnitRegistry};

/// Columns of the balance table, in output order.
pub const BALANCE_COLUMNS: [Column; 15] = [
    Column::new("ptRecoil", ColumnType::F32),
    Column::new("ptLeadJet", ColumnType::F32),
    Column::new("etaLeadJet", ColumnType::F32),
    Column::new("met", ColumnType::F32),
    Column::new("recoilMultiplicity", ColumnType::U16),
    Column::new("recoilMeanJetPt", ColumnType::F32),
    Column::new("A", ColumnType::F32),
    Column::new("alpha", ColumnType::F32),
    Column::new("beta", ColumnType::F32),
    Column::new("triggerBin", ColumnType::U16),
    Column::new("MJB", ColumnType::F32),
    Column::new("MPF", ColumnType::F32),
    Column::new("linearCorrection", ColumnType::F32),
    Column::new("logLinearCorrection", ColumnType::F32),
    Column::new("datasetWeight", ColumnType::F32),
];

/// Monotonic function `f` with `f(1) = 1` applied to the multijet balance.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrectionTransform {
    /// `1 + slope * (r - 1)`
    Linear { slope: f64 },
    /// `1 + slope * ln(r)`
    LogLinear { slope: f64 },
}

impl CorrectionTransform {
    pub fn apply(&self, ratio: f64) -> f64 {
        match *self {
            CorrectionTransform::Linear { slope } => 1.0 + slope * (ratio - 1.0),
            CorrectionTransform::LogLinear { slope } => 1.0 + slope * ratio.ln(),
        }
    }

    pub fn slope(&self) -> f64 {
        match *self {
            CorrectionTransform::Linear { slope } | CorrectionTransform::LogLinear { slope } => slope,
        }
    }
}

fn default_linear() -> CorrectionTransform {
    CorrectionTransform::Linear { slope: 1.0 }
}

fn default_log_linear() -> CorrectionTransform {
    CorrectionTransform::LogLinear { slope: 1.0 }
}

/// The two correction columns of the balance table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Corrections {
    #[serde(default = "default_linear")]
    pub linear: CorrectionTransform,
    #[serde(default = "default_log_linear")]
    pub log_linear: CorrectionTransform,
}

impl Default for Corrections {
    fn default() -> Self {
        Self {
            linear: default_linear(),
            log_linear: default_log_linear(),
        }
    }
}

/// Balance observables of one accepted event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceObservables {
    /// Multijet balance, `pt_lead / recoil_mean_pt`.
    pub mjb: f64,
    /// Missing-pt projection fraction, `1 + MET . u_lead / pt_lead`.
    pub mpf: f64,
    pub linear_correction: f64,
    pub log_linear_correction: f64,
}

/// `None` when a denominator vanishes or any observable is not finite.
pub fn balance_observables(recoil: &RecoilResult, corrections: &Corrections) -> Option<BalanceObservables> {
    let pt_lead = recoil.pt_lead();
    if !(pt_lead > 0.0 && recoil.recoil_mean_pt > 0.0) {
        return None;
    }

    let mjb = pt_lead / recoil.recoil_mean_pt;
    let lead_direction = recoil.lead_jet.pt_vec().scaled(1.0 / pt_lead);
    let mpf = 1.0 + recoil.met.dot(&lead_direction) / pt_lead;

    let observables = BalanceObservables {
        mjb,
        mpf,
        linear_correction: corrections.linear.apply(mjb),
        log_linear_correction: corrections.log_linear.apply(mjb),
    };

    let finite = [
        observables.mjb,
        observables.mpf,
        observables.linear_correction,
        observables.log_linear_correction,
    ]
    .iter()
    .all(|v| v.is_finite());
    finite.then_some(observables)
}

/// Names of the units a [`BalanceVars`] writer reads from.
#[derive(Debug, Clone)]
pub struct BalanceSources {
    pub recoil_builder: String,
    pub trigger_bin: String,
    pub output: String,
    /// Units whose weights enter the row weight in simulation.
    pub weights: Vec<String>,
}

struct WriterRun {
    recoil: UnitHandle,
    sink: Option<Box<dyn TableSink>>,
    is_simulation: bool,
    dataset_weight: f64,
}

/// Writes one row per accepted event into the table named after the unit.
pub struct BalanceVars {
    name: String,
    sources: BalanceSources,
    corrections: Corrections,
    run: Option<WriterRun>,
}

impl BalanceVars {
    pub fn new(name: impl Into<String>, sources: BalanceSources, corrections: Corrections) -> Self {
        Self {
            name: name.into(),
            sources,
            corrections,
            run: None,
        }
    }

    fn row(
        &self,
        recoil: &RecoilResult,
        multiplicity: u16,
        bin: u16,
        observables: &BalanceObservables,
        weight: f64,
    ) -> Vec<Value> {
        vec![
            Value::F32(recoil.pt_recoil() as f32),
            Value::F32(recoil.pt_lead() as f32),
            Value::F32(recoil.eta_lead() as f32),
            Value::F32(recoil.met.norm() as f32),
            Value::U16(multiplicity),
            Value::F32(recoil.recoil_mean_pt as f32),
            Value::F32(recoil.a as f32),
            Value::F32(recoil.alpha as f32),
            Value::F32(recoil.beta as f32),
            Value::U16(bin),
            Value::F32(observables.mjb as f32),
            Value::F32(observables.mpf as f32),
            Value::F32(observables.linear_correction as f32),
            Value::F32(observables.log_linear_correction as f32),
            Value::F32(weight as f32),
        ]
    }
}

impl Unit for BalanceVars {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<Requirement> {
        let mut requirements = vec![
            Requirement::mandatory(&self.sources.recoil_builder, Capability::Recoil),
            Requirement::mandatory(&self.sources.trigger_bin, Capability::TriggerBin),
            Requirement::mandatory(&self.sources.output, Capability::Output),
        ];
        requirements.extend(
            self.sources
                .weights
                .iter()
                .map(|name| Requirement::mandatory(name, Capability::EventWeight)),
        );
        requirements
    }

    fn begin_run(&mut self, dataset: &Arc<Dataset>, registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        let recoil = registry.require(&self.name, &self.sources.recoil_builder, Capability::Recoil)?;
        registry.require(&self.name, &self.sources.trigger_bin, Capability::TriggerBin)?;
        for weight in &self.sources.weights {
            registry.require(&self.name, weight, Capability::EventWeight)?;
        }

        let output = registry.require(&self.name, &self.sources.output, Capability::Output)?;
        let sink = registry
            .output(&self.name, output)?
            .open_table(&self.name, &BALANCE_COLUMNS)
            .map_err(|source| UnitError::Output {
                unit: self.name.clone(),
                source,
            })?;
        TableOpened {
            unit: &self.name,
            table: &self.name,
            column_count: BALANCE_COLUMNS.len(),
        }
        .log();

        self.run = Some(WriterRun {
            recoil,
            sink: Some(sink),
            is_simulation: dataset.is_simulation(),
            dataset_weight: dataset.normalization_weight(),
        });
        Ok(())
    }

    fn process_event(
        &mut self,
        event: &mut EventContext,
        upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        let run = self.run.as_ref().ok_or_else(|| UnitError::NotStarted {
            unit: self.name.clone(),
        })?;

        let recoil = upstream
            .recoil(&self.name, run.recoil)?
            .recoil()
            .ok_or_else(|| UnitError::MissingEventData {
                unit: self.name.clone(),
                what: "recoil".to_string(),
            })?;
        let bin = event.trigger_bin().ok_or_else(|| UnitError::MissingEventData {
            unit: self.name.clone(),
            what: "trigger bin".to_string(),
        })?;

        let weight = if run.is_simulation {
            run.dataset_weight * event.weight()
        } else {
            1.0
        };

        let Some(observables) = balance_observables(recoil, &self.corrections).filter(|_| weight.is_finite())
        else {
            EventRejected {
                unit: &self.name,
                event: event.index(),
                reason: "non-finite balance observable",
            }
            .log();
            return Ok(Decision::Reject);
        };

        let Ok(multiplicity) = u16::try_from(recoil.multiplicity()) else {
            EventRejected {
                unit: &self.name,
                event: event.index(),
                reason: "recoil multiplicity exceeds the column range",
            }
            .log();
            return Ok(Decision::Reject);
        };

        let row = self.row(recoil, multiplicity, bin, &observables, weight);
        let sink = self
            .run
            .as_mut()
            .and_then(|run| run.sink.as_mut())
            .ok_or_else(|| UnitError::NotStarted {
                unit: self.name.clone(),
            })?;
        sink.append(row).map_err(|source| UnitError::Output {
            unit: self.name.clone(),
            source,
        })?;

        Ok(Decision::Continue)
    }

    fn end_run(&mut self) -> Result<(), UnitError> {
        let Some(sink) = self.run.take().and_then(|run| run.sink) else {
            return Ok(());
        };
        sink.finish().map_err(|source| UnitError::Output {
            unit: self.name.clone(),
            source,
        })
    }

    fn clone_unit(&self) -> Box<dyn Unit> {
        Box::new(Self {
            name: self.name.clone(),
            sources: self.sources.clone(),
            corrections: self.corrections,
            run: None,
        })
    }
}
