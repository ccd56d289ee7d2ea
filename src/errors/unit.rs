// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by processing units during their lifecycle.

use crate::errors::StoreError;
use crate::traits::Capability;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnitError {
    /// `process_event` or a capability accessor was called before `begin_run`.
    #[error("unit '{unit}' was used before begin_run")]
    NotStarted { unit: String },

    #[error("unit '{requester}' requires '{dependency}', which is not registered earlier in the chain")]
    MissingDependency {
        requester: String,
        dependency: String,
    },

    #[error("unit '{requester}' requires '{dependency}' to provide {capability}")]
    CapabilityMismatch {
        requester: String,
        dependency: String,
        capability: Capability,
    },

    #[error("unit '{unit}' found no {what} in the current event")]
    MissingEventData { unit: String, what: String },

    #[error("unit '{unit}' failed to write output: {source}")]
    Output {
        unit: String,
        #[source]
        source: StoreError,
    },
}
