// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for preflight validation of the unit graph:
//! * Cyclic dependency detection
//! * Unresolved dependency detection
//! * Duplicate unit names
//! * Capability mismatches

use crate::observability::messages::StructuredLog;
use crate::traits::Capability;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic dependency detected among registered units.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct CyclicDependencyDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "cyclic_dependency",
            span_name = name,
            cycle = self.cycle.join(" -> "),
        )
    }
}

/// A unit names a dependency that is not registered.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnresolvedDependency<'a> {
    pub unit: &'a str,
    pub missing_dependency: &'a str,
}

impl Display for UnresolvedDependency<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' depends on '{}' which is not registered",
            self.unit, self.missing_dependency
        )
    }
}

impl StructuredLog for UnresolvedDependency<'_> {
    fn log(&self) {
        tracing::error!(
            unit = self.unit,
            missing_dependency = self.missing_dependency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unresolved_dependency",
            span_name = name,
            unit = self.unit,
            missing_dependency = self.missing_dependency,
        )
    }
}

/// Two units share a name.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateUnitName<'a> {
    pub unit: &'a str,
}

impl Display for DuplicateUnitName<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate unit name: '{}'", self.unit)
    }
}

impl StructuredLog for DuplicateUnitName<'_> {
    fn log(&self) {
        tracing::error!(unit = self.unit, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("duplicate_unit", span_name = name, unit = self.unit)
    }
}

/// A required unit does not provide the capability asked of it.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct CapabilityMismatchDetected<'a> {
    pub unit: &'a str,
    pub dependency: &'a str,
    pub capability: Capability,
}

impl Display for CapabilityMismatchDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' requires '{}' to provide {}",
            self.unit, self.dependency, self.capability
        )
    }
}

impl StructuredLog for CapabilityMismatchDetected<'_> {
    fn log(&self) {
        tracing::error!(
            unit = self.unit,
            dependency = self.dependency,
            capability = %self.capability,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "capability_mismatch",
            span_name = name,
            unit = self.unit,
            dependency = self.dependency,
        )
    }
}

/// Validation finished with errors.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ValidationFailed {
    pub unit_count: usize,
    pub error_count: usize,
}

impl Display for ValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validation of {} units failed with {} errors",
            self.unit_count, self.error_count
        )
    }
}

impl StructuredLog for ValidationFailed {
    fn log(&self) {
        tracing::error!(
            unit_count = self.unit_count,
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "validation_failed",
            span_name = name,
            unit_count = self.unit_count,
            error_count = self.error_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display() {
        let cycle = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        let msg = CyclicDependencyDetected { cycle: &cycle };
        assert_eq!(msg.to_string(), "Cyclic dependency detected: A -> B -> A");
    }

    #[test]
    fn test_capability_mismatch_display() {
        let msg = CapabilityMismatchDetected {
            unit: "BalanceVarsPt30",
            dependency: "TriggerBin",
            capability: Capability::Recoil,
        };
        assert_eq!(
            msg.to_string(),
            "Unit 'BalanceVarsPt30' requires 'TriggerBin' to provide a recoil result"
        );
    }
}
