// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::model::{Jet, Vector2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Run, luminosity block and event number of a collision event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventId {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
}

/// One event as read from an input file.
///
/// Jets arrive in whatever order the producer wrote them; the jet/MET reader
/// is responsible for selecting and sorting them into the event context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub id: EventId,
    #[serde(default)]
    pub jets: Vec<Jet>,
    #[serde(default)]
    pub met: Vector2,
    /// Shift of the missing energy under the unclustered-energy up variation.
    #[serde(default)]
    pub met_unclustered_shift: Option<Vector2>,
    /// Names of trigger paths that fired.
    #[serde(default)]
    pub triggers: Vec<String>,
    /// Named per-event weights precomputed by the producer (e.g. pileup).
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

/// Mutable state of the event being processed by one unit chain.
///
/// A context is created for every event and dropped once the chain has run.
/// The jet sequence is sorted by descending pt whenever it is set, so every
/// reader sees it ordered.
#[derive(Debug)]
pub struct EventContext {
    record: EventRecord,
    index: u64,
    is_simulation: bool,
    jets: Vec<Jet>,
    met: Vector2,
    trigger_bin: Option<u16>,
    weight: f64,
}

impl EventContext {
    pub fn new(record: EventRecord, index: u64, is_simulation: bool) -> Self {
        Self {
            record,
            index,
            is_simulation,
            jets: Vec::new(),
            met: Vector2::ZERO,
            trigger_bin: None,
            weight: 1.0,
        }
    }

    /// The raw record from the event source.
    pub fn record(&self) -> &EventRecord {
        &self.record
    }

    /// Position of the event in its dataset, starting from zero.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn is_simulation(&self) -> bool {
        self.is_simulation
    }

    /// Jets ordered by descending pt.
    pub fn jets(&self) -> &[Jet] {
        &self.jets
    }

    pub fn set_jets(&mut self, mut jets: Vec<Jet>) {
        jets.sort_by(|a, b| b.pt.total_cmp(&a.pt));
        self.jets = jets;
    }

    pub fn met(&self) -> Vector2 {
        self.met
    }

    pub fn set_met(&mut self, met: Vector2) {
        self.met = met;
    }

    pub fn trigger_bin(&self) -> Option<u16> {
        self.trigger_bin
    }

    pub fn set_trigger_bin(&mut self, bin: u16) {
        self.trigger_bin = Some(bin);
    }

    /// Product of all event weights applied so far.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn apply_weight(&mut self, factor: f64) {
        self.weight *= factor;
    }
}
