// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::UnitError;
use crate::model::{Dataset, EventContext};
use crate::traits::{Capability, Decision, Requirement, Unit, UnitKind, UnitRegistry};

/// Lifecycle calls seen by every clone of a [`StubUnit`], as `"<unit>:<call>"`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// A configurable unit for testing the orchestrator.
#[derive(Clone)]
pub struct StubUnit {
    name: String,
    kind: UnitKind,
    provides: &'static [Capability],
    requirements: Vec<Requirement>,
    reject_every: Option<u64>,
    calls: CallLog,
    events: Arc<AtomicUsize>,
}

impl StubUnit {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: UnitKind::Plugin,
            provides: &[],
            requirements: Vec::new(),
            reject_every: None,
            calls: CallLog::default(),
            events: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn service(mut self) -> Self {
        self.kind = UnitKind::Service;
        self
    }

    pub fn providing(mut self, provides: &'static [Capability]) -> Self {
        self.provides = provides;
        self
    }

    pub fn requiring(mut self, name: &str, capability: Capability) -> Self {
        self.requirements.push(Requirement::mandatory(name, capability));
        self
    }

    pub fn optionally_requiring(mut self, name: &str, capability: Capability) -> Self {
        self.requirements.push(Requirement::optional(name, capability));
        self
    }

    /// Reject events whose index is a multiple of `n`.
    pub fn rejecting_every(mut self, n: u64) -> Self {
        self.reject_every = Some(n);
        self
    }

    pub fn logging_to(mut self, calls: &CallLog) -> Self {
        self.calls = Arc::clone(calls);
        self
    }

    /// Events processed by this unit and all its clones.
    pub fn events_seen(&self) -> usize {
        self.events.load(Ordering::SeqCst)
    }

    fn record(&self, call: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{}:{}", self.name, call));
        }
    }
}

impl Unit for StubUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        self.kind
    }

    fn provides(&self) -> &'static [Capability] {
        self.provides
    }

    fn requirements(&self) -> Vec<Requirement> {
        self.requirements.clone()
    }

    fn begin_run(&mut self, dataset: &Arc<Dataset>, registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        for requirement in &self.requirements {
            if requirement.mandatory {
                registry.require(&self.name, &requirement.name, requirement.capability)?;
            } else {
                registry.optional(&self.name, &requirement.name, requirement.capability)?;
            }
        }
        self.record(&format!("begin_run({})", dataset.name()));
        Ok(())
    }

    fn process_event(
        &mut self,
        event: &mut EventContext,
        _upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        self.events.fetch_add(1, Ordering::SeqCst);
        match self.reject_every {
            Some(n) if event.index() % n == 0 => Ok(Decision::Reject),
            _ => Ok(Decision::Continue),
        }
    }

    fn end_run(&mut self) -> Result<(), UnitError> {
        self.record("end_run");
        Ok(())
    }

    fn clone_unit(&self) -> Box<dyn Unit> {
        Box::new(self.clone())
    }
}

/// A unit whose `begin_run` fails for one named dataset.
#[derive(Clone)]
pub struct FailingUnit {
    name: String,
    dataset: String,
}

impl FailingUnit {
    pub fn new(name: &str, dataset: &str) -> Self {
        Self {
            name: name.to_string(),
            dataset: dataset.to_string(),
        }
    }
}

impl Unit for FailingUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin_run(&mut self, dataset: &Arc<Dataset>, _registry: &UnitRegistry<'_>) -> Result<(), UnitError> {
        if dataset.name() == self.dataset {
            return Err(UnitError::MissingEventData {
                unit: self.name.clone(),
                what: "calibration input".to_string(),
            });
        }
        Ok(())
    }

    fn clone_unit(&self) -> Box<dyn Unit> {
        Box::new(self.clone())
    }
}
