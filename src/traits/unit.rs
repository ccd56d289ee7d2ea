// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::errors::UnitError;
use crate::model::{Dataset, EventContext};
use crate::traits::providers::{OutputService, RecoilProvider};
use crate::traits::registry::UnitRegistry;

/// Outcome of processing one event in one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Hand the event to the next unit in the chain.
    Continue,
    /// Stop the chain for this event; downstream units do not see it.
    Reject,
}

/// Services provide per-run resources and never see events; plugins run per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Service,
    Plugin,
}

/// Something a unit offers to the units that depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Fills the context with sorted jets and missing energy.
    JetMet,
    /// Sets the trigger bin of the context.
    TriggerBin,
    /// Multiplies a weight into the context.
    EventWeight,
    /// Exposes a recoil result through [`Unit::as_recoil`].
    Recoil,
    /// Hands out output tables through [`Unit::as_output`].
    Output,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::JetMet => "jets and missing energy",
            Capability::TriggerBin => "a trigger bin",
            Capability::EventWeight => "an event weight",
            Capability::Recoil => "a recoil result",
            Capability::Output => "output tables",
        };
        write!(f, "{}", name)
    }
}

/// A named unit this unit needs, and what it needs it for.
///
/// Mandatory requirements are checked before any dataset is opened; optional
/// ones only order the chain when the named unit happens to be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub capability: Capability,
    pub mandatory: bool,
}

impl Requirement {
    pub fn mandatory(name: impl Into<String>, capability: Capability) -> Self {
        Self {
            name: name.into(),
            capability,
            mandatory: true,
        }
    }

    pub fn optional(name: impl Into<String>, capability: Capability) -> Self {
        Self {
            name: name.into(),
            capability,
            mandatory: false,
        }
    }
}

/// A processing unit in the chain.
///
/// Registered units are prototypes: the orchestrator calls [`Unit::clone_unit`]
/// once per dataset and drives the clone through
/// `begin_run -> process_event* -> end_run`. A clone carries the configuration
/// of its prototype only, never resolved handles or per-run state, so clones
/// handed to different workers share nothing.
pub trait Unit: Send {
    /// Unique name the unit is registered and looked up under.
    fn name(&self) -> &str;

    fn kind(&self) -> UnitKind {
        UnitKind::Plugin
    }

    fn provides(&self) -> &'static [Capability] {
        &[]
    }

    /// Named units this unit resolves in `begin_run`.
    fn requirements(&self) -> Vec<Requirement> {
        Vec::new()
    }

    /// Prepare for a new dataset and resolve named dependencies among the
    /// units that precede this one.
    fn begin_run(&mut self, dataset: &Arc<Dataset>, registry: &UnitRegistry<'_>)
        -> Result<(), UnitError>;

    /// Process the current event. Services are never called.
    fn process_event(
        &mut self,
        _event: &mut EventContext,
        _upstream: &UnitRegistry<'_>,
    ) -> Result<Decision, UnitError> {
        Ok(Decision::Continue)
    }

    /// Called once after the last event of the dataset.
    fn end_run(&mut self) -> Result<(), UnitError> {
        Ok(())
    }

    /// Fresh, unstarted copy carrying only the configuration.
    fn clone_unit(&self) -> Box<dyn Unit>;

    fn as_recoil(&self) -> Option<&dyn RecoilProvider> {
        None
    }

    fn as_output(&self) -> Option<&dyn OutputService> {
        None
    }
}
