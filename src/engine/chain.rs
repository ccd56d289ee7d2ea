// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One dataset's worth of unit clones, driven sequentially.

use std::sync::Arc;
use std::time::Instant;

use crate::engine::summary::{DatasetStatus, DatasetSummary, UnitRejections};
use crate::errors::{DatasetError, Stage, UnitError};
use crate::io::EventSource;
use crate::model::{Dataset, EventContext};
use crate::observability::messages::engine::{DatasetCompleted, DatasetFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::{Decision, Unit, UnitKind, UnitRegistry};

/// Units in execution order, owned by a single worker.
///
/// Every unit only ever sees the units before it, through a [`UnitRegistry`]
/// over the prefix of the chain. A plugin runs for an event only when every
/// unit it is gated on passed that event, so a rejection skips the units
/// downstream of it while sibling branches keep running.
pub struct UnitChain {
    units: Vec<Box<dyn Unit>>,
    gates: Vec<Vec<usize>>,
    terminals: Vec<usize>,
    passed: Vec<bool>,
    rejections: Vec<u64>,
}

impl UnitChain {
    /// A linear chain: each unit is gated on the closest plugin before it.
    pub fn new(units: Vec<Box<dyn Unit>>) -> Self {
        let mut previous = None;
        let gates = units
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                let gate: Vec<usize> = previous.into_iter().collect();
                if unit.kind() == UnitKind::Plugin {
                    previous = Some(index);
                }
                gate
            })
            .collect();
        Self::with_gates(units, gates)
    }

    /// A chain with explicit gates. `gates[i]` lists the positions unit `i`
    /// waits on; every position must be smaller than `i`.
    pub fn with_gates(units: Vec<Box<dyn Unit>>, gates: Vec<Vec<usize>>) -> Self {
        let is_plugin: Vec<bool> = units.iter().map(|unit| unit.kind() == UnitKind::Plugin).collect();

        let mut gating = vec![false; units.len()];
        for (index, gate) in gates.iter().enumerate() {
            if is_plugin[index] {
                gate.iter().for_each(|&g| gating[g] = true);
            }
        }
        let terminals = (0..units.len()).filter(|&i| is_plugin[i] && !gating[i]).collect();

        let count = units.len();
        Self {
            units,
            gates,
            terminals,
            passed: vec![false; count],
            rejections: vec![0; count],
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.units.iter().map(|unit| unit.name()).collect()
    }

    /// Plugins no other plugin is gated on. An event is accepted when at
    /// least one of them passes it.
    pub fn terminals(&self) -> Vec<&str> {
        self.terminals.iter().map(|&index| self.units[index].name()).collect()
    }

    fn unit_error(&self, dataset: &Dataset, index: usize, stage: Stage, source: UnitError) -> DatasetError {
        DatasetError::Unit {
            dataset: dataset.name().to_string(),
            unit: self.units[index].name().to_string(),
            stage,
            source,
        }
    }

    pub fn begin_run(&mut self, dataset: &Arc<Dataset>) -> Result<(), DatasetError> {
        self.rejections.iter_mut().for_each(|count| *count = 0);

        for index in 0..self.units.len() {
            let (before, rest) = self.units.split_at_mut(index);
            let registry = UnitRegistry::new(before);
            if let Err(source) = rest[0].begin_run(dataset, &registry) {
                return Err(self.unit_error(dataset, index, Stage::BeginRun, source));
            }
        }
        Ok(())
    }

    /// Run one event through the plugins. Units gated on a rejecting or
    /// skipped unit are skipped for this event.
    pub fn process_event(&mut self, dataset: &Dataset, event: &mut EventContext) -> Result<Decision, DatasetError> {
        for index in 0..self.units.len() {
            let (before, rest) = self.units.split_at_mut(index);
            let unit = &mut rest[0];
            if unit.kind() == UnitKind::Service {
                self.passed[index] = true;
                continue;
            }
            if !self.gates[index].iter().all(|&gate| self.passed[gate]) {
                self.passed[index] = false;
                continue;
            }

            let registry = UnitRegistry::new(before);
            match unit.process_event(event, &registry) {
                Ok(Decision::Continue) => self.passed[index] = true,
                Ok(Decision::Reject) => {
                    self.rejections[index] += 1;
                    self.passed[index] = false;
                }
                Err(source) => return Err(self.unit_error(dataset, index, Stage::ProcessEvent, source)),
            }
        }

        let accepted = self.terminals.is_empty() || self.terminals.iter().any(|&index| self.passed[index]);
        Ok(if accepted { Decision::Continue } else { Decision::Reject })
    }

    pub fn end_run(&mut self, dataset: &Dataset) -> Result<(), DatasetError> {
        for index in 0..self.units.len() {
            if let Err(source) = self.units[index].end_run() {
                return Err(self.unit_error(dataset, index, Stage::EndRun, source));
            }
        }
        Ok(())
    }

    /// Rejection counts of the plugins, in chain order.
    pub fn rejections(&self) -> Vec<UnitRejections> {
        self.units
            .iter()
            .zip(&self.rejections)
            .filter(|(unit, _)| unit.kind() == UnitKind::Plugin)
            .map(|(unit, rejected)| UnitRejections {
                unit: unit.name().to_string(),
                rejected: *rejected,
            })
            .collect()
    }

    /// Process a whole dataset. Any error abandons the dataset and is
    /// recorded in the returned summary.
    pub fn run_dataset(&mut self, dataset: &Arc<Dataset>, source: &dyn EventSource) -> DatasetSummary {
        let start = Instant::now();
        let mut summary = DatasetSummary::new(dataset.name());

        let result = self.drive(dataset, source, &mut summary);
        summary.rejections = self.rejections();
        summary.duration = start.elapsed();

        match result {
            Ok(()) => DatasetCompleted {
                dataset: dataset.name(),
                events_read: summary.events_read,
                events_accepted: summary.events_accepted,
                duration: summary.duration,
            }
            .log(),
            Err(error) => {
                DatasetFailed {
                    dataset: dataset.name(),
                    error: &error,
                }
                .log();
                summary.status = DatasetStatus::Failed(error.to_string());
            }
        }
        summary
    }

    fn drive(
        &mut self,
        dataset: &Arc<Dataset>,
        source: &dyn EventSource,
        summary: &mut DatasetSummary,
    ) -> Result<(), DatasetError> {
        let source_error = |error| DatasetError::Source {
            dataset: dataset.name().to_string(),
            source: error,
        };

        let events = source.open(dataset).map_err(source_error)?;
        self.begin_run(dataset)?;

        for (index, record) in events.enumerate() {
            let record = record.map_err(source_error)?;
            summary.events_read += 1;

            let mut event = EventContext::new(record, index as u64, dataset.is_simulation());
            if self.process_event(dataset, &mut event)? == Decision::Continue {
                summary.events_accepted += 1;
            }
        }

        self.end_run(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySource;
    use crate::model::EventRecord;
    use crate::plugins::stub::{CallLog, FailingUnit, StubUnit};
    use crate::traits::Capability;

    fn records(count: usize) -> Vec<EventRecord> {
        (0..count).map(|_| EventRecord::default()).collect()
    }

    #[test]
    fn test_rejection_stops_the_chain() {
        let filter = StubUnit::new("filter").rejecting_every(2);
        let writer = StubUnit::new("writer");
        let mut chain = UnitChain::new(vec![Box::new(filter.clone()), Box::new(writer.clone())]);

        let dataset = Arc::new(Dataset::data("JetHT"));
        let source = MemorySource::new().with_events("JetHT", records(5));
        let summary = chain.run_dataset(&dataset, &source);

        assert_eq!(summary.status, DatasetStatus::Completed);
        assert_eq!(summary.events_read, 5);
        assert_eq!(summary.events_accepted, 2);
        assert_eq!(summary.rejected_by("filter"), Some(3));
        assert_eq!(summary.rejected_by("writer"), Some(0));
        assert_eq!(filter.events_seen(), 5);
        assert_eq!(writer.events_seen(), 2);
    }

    #[test]
    fn test_rejection_only_skips_gated_branch() {
        let low_cut = StubUnit::new("cut-low").rejecting_every(1);
        let low_writer = StubUnit::new("writer-low");
        let high_cut = StubUnit::new("cut-high").rejecting_every(2);
        let high_writer = StubUnit::new("writer-high");
        let mut chain = UnitChain::with_gates(
            vec![
                Box::new(StubUnit::new("reader")),
                Box::new(low_cut.clone()),
                Box::new(low_writer.clone()),
                Box::new(high_cut.clone()),
                Box::new(high_writer.clone()),
            ],
            vec![vec![], vec![0], vec![1], vec![0], vec![3]],
        );
        assert_eq!(chain.terminals(), vec!["writer-low", "writer-high"]);

        let dataset = Arc::new(Dataset::data("JetHT"));
        let source = MemorySource::new().with_events("JetHT", records(3));
        let summary = chain.run_dataset(&dataset, &source);

        assert_eq!(low_cut.events_seen(), 3);
        assert_eq!(low_writer.events_seen(), 0);
        assert_eq!(high_cut.events_seen(), 3);
        assert_eq!(high_writer.events_seen(), 1);
        assert_eq!(summary.rejected_by("cut-low"), Some(3));
        assert_eq!(summary.rejected_by("cut-high"), Some(2));
        assert_eq!(summary.events_accepted, 1);
    }

    #[test]
    fn test_skipped_units_propagate_downstream() {
        let filter = StubUnit::new("filter").rejecting_every(1);
        let middle = StubUnit::new("middle");
        let writer = StubUnit::new("writer");
        let mut chain = UnitChain::with_gates(
            vec![Box::new(filter.clone()), Box::new(middle.clone()), Box::new(writer.clone())],
            vec![vec![], vec![0], vec![1]],
        );

        let dataset = Arc::new(Dataset::data("JetHT"));
        let source = MemorySource::new().with_events("JetHT", records(2));
        let summary = chain.run_dataset(&dataset, &source);

        assert_eq!(middle.events_seen(), 0);
        assert_eq!(writer.events_seen(), 0);
        assert_eq!(summary.rejected_by("middle"), Some(0));
        assert_eq!(summary.events_accepted, 0);
    }

    #[test]
    fn test_services_skip_events_and_rejection_counts() {
        let service = StubUnit::new("Output").service();
        let plugin = StubUnit::new("plugin");
        let mut chain = UnitChain::new(vec![Box::new(service.clone()), Box::new(plugin)]);

        let dataset = Arc::new(Dataset::data("JetHT"));
        let source = MemorySource::new().with_events("JetHT", records(3));
        let summary = chain.run_dataset(&dataset, &source);

        assert_eq!(service.events_seen(), 0);
        assert_eq!(summary.events_accepted, 3);
        assert_eq!(summary.rejections.len(), 1);
        assert_eq!(summary.rejections[0].unit, "plugin");
    }

    #[test]
    fn test_lifecycle_order() {
        let calls = CallLog::default();
        let mut chain = UnitChain::new(vec![
            Box::new(StubUnit::new("a").providing(&[Capability::JetMet]).logging_to(&calls)),
            Box::new(StubUnit::new("b").requiring("a", Capability::JetMet).logging_to(&calls)),
        ]);

        let dataset = Arc::new(Dataset::data("JetHT"));
        let source = MemorySource::new().with_events("JetHT", records(1));
        chain.run_dataset(&dataset, &source);

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["a:begin_run(JetHT)", "b:begin_run(JetHT)", "a:end_run", "b:end_run"]
        );
    }

    #[test]
    fn test_registry_only_sees_earlier_units() {
        let mut chain = UnitChain::new(vec![
            Box::new(StubUnit::new("b").requiring("a", Capability::JetMet)),
            Box::new(StubUnit::new("a").providing(&[Capability::JetMet])),
        ]);

        let dataset = Arc::new(Dataset::data("JetHT"));
        let source = MemorySource::new().with_events("JetHT", records(1));
        let summary = chain.run_dataset(&dataset, &source);

        match summary.status {
            DatasetStatus::Failed(error) => {
                assert!(error.contains("'b'"), "unexpected error: {}", error);
                assert!(error.contains("begin_run"), "unexpected error: {}", error);
            }
            DatasetStatus::Completed => panic!("expected begin_run to fail"),
        }
    }

    #[test]
    fn test_failures_are_recorded() {
        let dataset = Arc::new(Dataset::data("JetHT"));

        let mut chain = UnitChain::new(vec![Box::new(FailingUnit::new("calib", "JetHT"))]);
        let source = MemorySource::new().with_events("JetHT", records(2));
        let summary = chain.run_dataset(&dataset, &source);
        assert!(summary.status.is_failed());
        assert_eq!(summary.events_read, 0);

        let mut chain = UnitChain::new(vec![Box::new(StubUnit::new("a"))]);
        let summary = chain.run_dataset(&dataset, &MemorySource::new());
        match summary.status {
            DatasetStatus::Failed(error) => assert!(error.contains("JetHT")),
            DatasetStatus::Completed => panic!("expected the source to fail"),
        }
    }
}
