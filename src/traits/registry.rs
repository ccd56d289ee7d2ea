// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::UnitError;
use crate::traits::{Capability, OutputService, RecoilProvider, Unit};

/// Position of a resolved dependency in the current chain.
///
/// Handles are obtained in `begin_run` and stay valid for the rest of that
/// run; they are never carried over by `clone_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitHandle(usize);

impl UnitHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Name-based view of the units that precede a given unit in its chain.
///
/// Lookups are by registered name, and access goes through capability
/// accessors, so units never depend on each other's concrete types.
pub struct UnitRegistry<'a> {
    units: &'a [Box<dyn Unit>],
}

impl<'a> UnitRegistry<'a> {
    pub fn new(units: &'a [Box<dyn Unit>]) -> Self {
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<UnitHandle> {
        self.units
            .iter()
            .position(|unit| unit.name() == name)
            .map(UnitHandle)
    }

    /// Resolve a dependency that must exist and provide `capability`.
    pub fn require(
        &self,
        requester: &str,
        name: &str,
        capability: Capability,
    ) -> Result<UnitHandle, UnitError> {
        self.optional(requester, name, capability)?
            .ok_or_else(|| UnitError::MissingDependency {
                requester: requester.to_string(),
                dependency: name.to_string(),
            })
    }

    /// Resolve a dependency that may be absent. A unit that is present but
    /// lacks the capability is still an error.
    pub fn optional(
        &self,
        requester: &str,
        name: &str,
        capability: Capability,
    ) -> Result<Option<UnitHandle>, UnitError> {
        let Some(handle) = self.find(name) else {
            return Ok(None);
        };

        if self.units[handle.0].provides().contains(&capability) {
            Ok(Some(handle))
        } else {
            Err(UnitError::CapabilityMismatch {
                requester: requester.to_string(),
                dependency: name.to_string(),
                capability,
            })
        }
    }

    pub fn unit(&self, handle: UnitHandle) -> Option<&'a dyn Unit> {
        self.units.get(handle.0).map(|unit| unit.as_ref())
    }

    pub fn recoil(&self, requester: &str, handle: UnitHandle) -> Result<&'a dyn RecoilProvider, UnitError> {
        self.unit(handle)
            .and_then(|unit| unit.as_recoil())
            .ok_or_else(|| self.mismatch(requester, handle, Capability::Recoil))
    }

    pub fn output(&self, requester: &str, handle: UnitHandle) -> Result<&'a dyn OutputService, UnitError> {
        self.unit(handle)
            .and_then(|unit| unit.as_output())
            .ok_or_else(|| self.mismatch(requester, handle, Capability::Output))
    }

    fn mismatch(&self, requester: &str, handle: UnitHandle, capability: Capability) -> UnitError {
        match self.unit(handle) {
            Some(unit) => UnitError::CapabilityMismatch {
                requester: requester.to_string(),
                dependency: unit.name().to_string(),
                capability,
            },
            None => UnitError::MissingDependency {
                requester: requester.to_string(),
                dependency: format!("#{}", handle.0),
            },
        }
    }
}
