// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::config::registry::Registration;
use crate::errors::ValidationError;
use crate::traits::UnitKind;

/// Dependency name -> names of the units that must run after it.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph(pub HashMap<String, Vec<String>>);

impl DependencyGraph {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Graph over registered units. Edges to unregistered names are left out;
    /// reference validation reports them.
    pub fn from_registrations(registrations: &[Registration]) -> Self {
        let registered: HashSet<&str> = registrations.iter().map(|r| r.name()).collect();
        let mut graph = Self::new();

        for registration in registrations {
            graph.0.entry(registration.name().to_string()).or_default();
        }
        for registration in registrations {
            for dependency in registration.predecessors(&registered) {
                if registered.contains(dependency.as_str()) {
                    graph.add_dependency(&dependency, registration.name());
                }
            }
        }

        graph
    }

    pub fn add_dependency(&mut self, dependency: &str, dependent: &str) {
        self.0
            .entry(dependency.to_string())
            .or_default()
            .push(dependent.to_string());
    }

    pub fn get_dependents(&self, name: &str) -> Option<&Vec<String>> {
        self.0.get(name)
    }
}

fn kind_rank(kind: UnitKind) -> u8 {
    match kind {
        UnitKind::Service => 0,
        UnitKind::Plugin => 1,
    }
}

/// Topological order of the registrations, as indices.
///
/// Kahn's algorithm; among the units that are ready, services go first and
/// then registration order decides, so the order is deterministic. Expects
/// unique names.
pub fn execution_order(registrations: &[Registration]) -> Result<Vec<usize>, ValidationError> {
    let graph = DependencyGraph::from_registrations(registrations);
    let index_of: HashMap<&str, usize> = registrations
        .iter()
        .enumerate()
        .map(|(index, r)| (r.name(), index))
        .collect();

    let mut in_degree = vec![0usize; registrations.len()];
    for dependents in graph.0.values() {
        for dependent in dependents {
            if let Some(&index) = index_of.get(dependent.as_str()) {
                in_degree[index] += 1;
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<(u8, usize)>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| Reverse((kind_rank(registrations[index].kind()), index)))
        .collect();

    let mut order = Vec::with_capacity(registrations.len());
    while let Some(Reverse((_, index))) = ready.pop() {
        order.push(index);
        let dependents = graph
            .get_dependents(registrations[index].name())
            .map(Vec::as_slice)
            .unwrap_or_default();
        for dependent in dependents {
            if let Some(&next) = index_of.get(dependent.as_str()) {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse((kind_rank(registrations[next].kind()), next)));
                }
            }
        }
    }

    if order.len() < registrations.len() {
        let cycle = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree > 0)
            .map(|(index, _)| registrations[index].name().to_string())
            .collect();
        return Err(ValidationError::CyclicDependency { cycle });
    }

    Ok(order)
}
