// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Preflight validation of the registered unit graph.
//!
//! Runs before any dataset is opened, in four stages:
//!
//! 1. **Uniqueness**: every unit name is registered once
//! 2. **References**: explicit dependencies and mandatory requirements name
//!    registered units
//! 3. **Capabilities**: every required unit that is registered provides the
//!    capability asked of it
//! 4. **Cycles**: DFS with a recursion stack over the dependency graph
//!
//! Errors of the first three stages are accumulated and reported together.
//! Cycle detection needs a well-formed graph and only runs when they pass.
//!
//! ## Cycle detection
//! "Three colors" DFS: a node is white until visited, gray while on the
//! recursion stack and black once explored. Reaching a gray node closes a
//! cycle; the path from that node to the current one is reported. Roots and
//! neighbours are visited in registration order, so the reported path is
//! deterministic. O(V + E) time, O(V) space.

use std::collections::HashSet;

use crate::config::dependency_graph::DependencyGraph;
use crate::config::registry::Registration;
use crate::errors::{ValidationError, ValidationErrors};
use crate::observability::messages::validation::{
    CapabilityMismatchDetected, CyclicDependencyDetected, DuplicateUnitName, UnresolvedDependency,
    ValidationFailed,
};
use crate::observability::messages::StructuredLog;

/// Validate the registrations; all errors found are returned together.
pub fn validate_registrations(registrations: &[Registration]) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_names(registrations) {
        errors.extend(duplicate_errors);
    }

    if let Err(unresolved_errors) = validate_dependency_references(registrations) {
        errors.extend(unresolved_errors);
    }

    if let Err(capability_errors) = validate_capabilities(registrations) {
        errors.extend(capability_errors);
    }

    if errors.is_empty() {
        if let Err(cycle_error) = validate_acyclic_graph(registrations) {
            errors.push(cycle_error);
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    for error in &errors {
        log_validation_error(error);
    }
    ValidationFailed {
        unit_count: registrations.len(),
        error_count: errors.len(),
    }
    .log();

    Err(ValidationErrors(errors))
}

fn log_validation_error(error: &ValidationError) {
    match error {
        ValidationError::CyclicDependency { cycle } => CyclicDependencyDetected { cycle }.log(),
        ValidationError::UnresolvedDependency {
            unit,
            missing_dependency,
        } => UnresolvedDependency {
            unit,
            missing_dependency,
        }
        .log(),
        ValidationError::DuplicateUnitName { unit } => DuplicateUnitName { unit }.log(),
        ValidationError::CapabilityMismatch {
            unit,
            dependency,
            capability,
        } => CapabilityMismatchDetected {
            unit,
            dependency,
            capability: *capability,
        }
        .log(),
    }
}

fn validate_unique_names(registrations: &[Registration]) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for registration in registrations {
        if !seen.insert(registration.name()) {
            errors.push(ValidationError::DuplicateUnitName {
                unit: registration.name().to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_dependency_references(registrations: &[Registration]) -> Result<(), Vec<ValidationError>> {
    let registered: HashSet<&str> = registrations.iter().map(|r| r.name()).collect();
    let mut errors = Vec::new();

    for registration in registrations {
        for dependency in registration.predecessors(&registered) {
            if !registered.contains(dependency.as_str()) {
                errors.push(ValidationError::UnresolvedDependency {
                    unit: registration.name().to_string(),
                    missing_dependency: dependency,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_capabilities(registrations: &[Registration]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for registration in registrations {
        for requirement in registration.requirements() {
            let Some(target) = registrations.iter().find(|r| r.name() == requirement.name) else {
                continue;
            };
            if !target.prototype().provides().contains(&requirement.capability) {
                errors.push(ValidationError::CapabilityMismatch {
                    unit: registration.name().to_string(),
                    dependency: requirement.name.clone(),
                    capability: requirement.capability,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_acyclic_graph(registrations: &[Registration]) -> Result<(), ValidationError> {
    let graph = DependencyGraph::from_registrations(registrations);

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for registration in registrations {
        let name = registration.name();
        if visited.contains(name) {
            continue;
        }
        if let Some(cycle) = dfs_cycle_detection(name, &graph, &mut visited, &mut rec_stack, &mut path) {
            return Err(ValidationError::CyclicDependency { cycle });
        }
    }

    Ok(())
}

fn dfs_cycle_detection(
    node: &str,
    graph: &DependencyGraph,
    visited: &mut HashSet<String>,
    rec_stack: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    visited.insert(node.to_string());
    rec_stack.insert(node.to_string());
    path.push(node.to_string());

    if let Some(neighbors) = graph.get_dependents(node) {
        for neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|x| x == neighbor).unwrap_or(0);
                let mut cycle = path[cycle_start..].to_vec();
                cycle.push(neighbor.clone());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
