// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dataset orchestrator: resolves the unit graph once and runs every dataset
//! through its own clone of the chain.
//!
//! # Execution Flow
//!
//! 1. **Validation**: unique names, resolvable dependencies, matching
//!    capabilities, no cycles. Any failure aborts the run before a dataset
//!    is opened.
//! 2. **Ordering**: Kahn's algorithm, services first, then registration order.
//! 3. **Cloning**: one fresh chain per dataset, cloned from the prototypes.
//! 4. **Dispatch**: datasets run on blocking workers, at most `worker_count`
//!    at a time, bounded by a semaphore.
//! 5. **Collection**: summaries are joined back in dataset order.
//!
//! Events of a dataset are always processed sequentially, in source order, by
//! the one worker that owns its chain. A unit runs for an event only if all of
//! its predecessors passed it, so one pt-cut branch rejecting an event does
//! not hide it from the others. A failing dataset is recorded in the
//! summary and does not stop the others.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use multijet_balance::engine::Orchestrator;
//! use multijet_balance::io::MemorySource;
//! use multijet_balance::model::Dataset;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = MemorySource::new().with_events("JetHT", Vec::new());
//! let orchestrator = Orchestrator::new(Arc::new(source));
//!
//! let summary = orchestrator.run(vec![Dataset::data("JetHT")], 1).await?;
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use crate::config::{execution_order, validate_registrations, Registration};
use crate::engine::chain::UnitChain;
use crate::engine::summary::RunSummary;
use crate::errors::{RunError, ValidationErrors};
use crate::io::EventSource;
use crate::model::Dataset;
use crate::observability::messages::engine::{DatasetStarted, ExecutionOrderResolved, RunCompleted, RunStarted};
use crate::observability::messages::StructuredLog;

pub struct Orchestrator {
    source: Arc<dyn EventSource>,
    registrations: Vec<Registration>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            source,
            registrations: Vec::new(),
        }
    }

    pub fn register(&mut self, registration: Registration) -> &mut Self {
        self.registrations.push(registration);
        self
    }

    pub fn with_registrations<I>(mut self, registrations: I) -> Self
    where
        I: IntoIterator<Item = Registration>,
    {
        self.registrations.extend(registrations);
        self
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Validate the registrations and return the execution order as indices.
    pub fn resolve(&self) -> Result<Vec<usize>, RunError> {
        validate_registrations(&self.registrations).map_err(RunError::Configuration)?;
        execution_order(&self.registrations)
            .map_err(|error| RunError::Configuration(ValidationErrors(vec![error])))
    }

    /// Names of the units in execution order.
    pub fn execution_order(&self) -> Result<Vec<&str>, RunError> {
        Ok(self
            .resolve()?
            .into_iter()
            .map(|index| self.registrations[index].name())
            .collect())
    }

    /// Chain positions each unit waits on, from the resolved predecessors.
    fn gates(&self, order: &[usize]) -> Vec<Vec<usize>> {
        let registered: HashSet<&str> = self.registrations.iter().map(|r| r.name()).collect();
        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(position, &index)| (self.registrations[index].name(), position))
            .collect();

        order
            .iter()
            .map(|&index| {
                self.registrations[index]
                    .predecessors(&registered)
                    .iter()
                    .filter_map(|name| position.get(name.as_str()).copied())
                    .collect()
            })
            .collect()
    }

    fn clone_chain(&self, order: &[usize], gates: &[Vec<usize>]) -> UnitChain {
        UnitChain::with_gates(
            order
                .iter()
                .map(|&index| self.registrations[index].prototype().clone_unit())
                .collect(),
            gates.to_vec(),
        )
    }

    /// Run every dataset through a fresh chain.
    ///
    /// Only configuration problems fail the whole run; dataset errors end up
    /// in the returned summary.
    pub async fn run(&self, datasets: Vec<Dataset>, worker_count: usize) -> Result<RunSummary, RunError> {
        if worker_count == 0 {
            return Err(RunError::InvalidWorkerCount);
        }

        let order = self.resolve()?;
        let names: Vec<&str> = order.iter().map(|&index| self.registrations[index].name()).collect();
        ExecutionOrderResolved { order: &names }.log();

        RunStarted {
            dataset_count: datasets.len(),
            unit_count: order.len(),
            worker_count,
        }
        .log();

        let gates = self.gates(&order);
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(worker_count));
        let mut tasks = Vec::with_capacity(datasets.len());

        for dataset in datasets {
            let mut chain = self.clone_chain(&order, &gates);
            let source = Arc::clone(&self.source);
            let dataset = Arc::new(dataset);

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| RunError::Worker(format!("failed to acquire worker permit: {}", e)))?;

            let task = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let started = DatasetStarted {
                    dataset: dataset.name(),
                    is_simulation: dataset.is_simulation(),
                    unit_count: chain.len(),
                };
                let span = started.span("process_dataset");
                let _guard = span.enter();
                started.log();

                chain.run_dataset(&dataset, source.as_ref())
            });
            tasks.push(task);
        }

        let mut summaries = Vec::with_capacity(tasks.len());
        for task in tasks {
            let summary = task
                .await
                .map_err(|e| RunError::Worker(format!("dataset task panicked or was cancelled: {}", e)))?;
            summaries.push(summary);
        }

        let summary = RunSummary {
            datasets: summaries,
            duration: start.elapsed(),
        };
        RunCompleted {
            dataset_count: summary.datasets.len(),
            failed_count: summary.failed_count(),
            duration: summary.duration,
        }
        .log();

        Ok(summary)
    }
}
