// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::traits::{Requirement, Unit, UnitKind};

/// A unit prototype registered with the orchestrator, plus the names it must
/// run after in addition to those its requirements imply.
pub struct Registration {
    prototype: Box<dyn Unit>,
    depends_on: Vec<String>,
}

impl Registration {
    pub fn new(prototype: Box<dyn Unit>) -> Self {
        Self {
            prototype,
            depends_on: Vec::new(),
        }
    }

    pub fn after<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        self.prototype.name()
    }

    pub fn kind(&self) -> UnitKind {
        self.prototype.kind()
    }

    pub fn prototype(&self) -> &dyn Unit {
        self.prototype.as_ref()
    }

    /// Explicit dependency names.
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn requirements(&self) -> Vec<Requirement> {
        self.prototype.requirements()
    }

    /// Every name this unit must be ordered after: explicit dependencies,
    /// mandatory requirements and the optional requirements that are
    /// registered. Duplicates are dropped, first occurrence wins.
    pub fn predecessors(&self, registered: &HashSet<&str>) -> Vec<String> {
        let explicit = self.depends_on.iter().cloned();
        let required = self
            .requirements()
            .into_iter()
            .filter(|r| r.mandatory || registered.contains(r.name.as_str()))
            .map(|r| r.name);

        let mut seen = HashSet::new();
        explicit
            .chain(required)
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::stub::StubUnit;
    use crate::traits::Capability;

    #[test]
    fn test_predecessors_merge_explicit_and_required() {
        let registration = Registration::new(Box::new(
            StubUnit::new("writer")
                .requiring("builder", Capability::Recoil)
                .requiring("bins", Capability::TriggerBin)
                .optionally_requiring("weights", Capability::EventWeight)
                .optionally_requiring("absent", Capability::EventWeight),
        ))
        .after(["builder", "filter"]);

        let registered: HashSet<&str> = ["builder", "bins", "weights", "filter"].into_iter().collect();
        assert_eq!(
            registration.predecessors(&registered),
            vec!["builder", "filter", "bins", "weights"]
        );
    }
}
