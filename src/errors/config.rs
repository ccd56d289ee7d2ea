// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::traits::Capability;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during unit graph validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected in the unit graph
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
    /// A unit references a dependency that is not registered
    UnresolvedDependency {
        unit: String,
        missing_dependency: String,
    },
    /// Two units were registered under the same name
    DuplicateUnitName { unit: String },
    /// A required unit exists but does not provide the requested capability
    CapabilityMismatch {
        unit: String,
        dependency: String,
        capability: Capability,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedDependency {
                unit,
                missing_dependency,
            } => {
                write!(
                    f,
                    "Unit '{}' depends on '{}' which is not registered",
                    unit, missing_dependency
                )
            }
            ValidationError::DuplicateUnitName { unit } => {
                write!(f, "Duplicate unit name: '{}'", unit)
            }
            ValidationError::CapabilityMismatch {
                unit,
                dependency,
                capability,
            } => {
                write!(
                    f,
                    "Unit '{}' requires '{}' to provide {}, which it does not",
                    unit, dependency, capability
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// All validation failures found in one pass, reported together.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("\n"))
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

/// Errors in the run configuration surface. All of them are raised before
/// any dataset is opened.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot recognize dataset group \"{0}\"")]
    UnknownDatasetGroup(String),

    #[error("cannot recognize systematic variation \"{0}\"")]
    UnknownSystematic(String),

    #[error("cannot parse jet pt cut \"{0}\"; integer values are expected")]
    InvalidPtCut(String),

    #[error("at least one jet pt cut is required")]
    NoPtCuts,

    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("trigger bin edges must be a non-empty, strictly increasing list")]
    InvalidTriggerEdges,

    #[error("{paths} trigger paths configured for {bins} trigger bins")]
    TriggerPathCount { paths: usize, bins: usize },

    #[error("simulated dataset '{0}' needs a positive cross-section and generated event count")]
    MissingNormalization(String),

    #[error("no datasets selected for group '{0}'")]
    NoDatasets(String),

    #[error("invalid {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}
