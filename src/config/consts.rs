// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Jet pt threshold (GeV) for recoil jets when none is configured
pub const DEFAULT_PT_CUTS: [u32; 1] = [30];
/// Leading-jet pt edges (GeV) of the trigger bins
pub const DEFAULT_TRIGGER_BIN_EDGES: [f64; 6] = [200.0, 250.0, 300.0, 370.0, 450.0, 510.0];
/// Single-jet trigger paths, one per trigger bin
pub const DEFAULT_TRIGGER_PATHS: [&str; 6] = [
    "PFJet140", "PFJet200", "PFJet260", "PFJet320", "PFJet400", "PFJet450",
];

pub const DEFAULT_MAX_A: f64 = 0.6;
pub const DEFAULT_MAX_ALPHA: f64 = 0.3;
pub const DEFAULT_MAX_BETA: f64 = 1.0;
pub const DEFAULT_BETA_PT_FRACTION: f64 = 0.05;

pub const DEFAULT_LEADING_JET_MIN_PT: f64 = 0.0;
pub const DEFAULT_LEADING_JET_MAX_ABS_ETA: f64 = 1.3;

/// Key of the pileup weight in the event record
pub const DEFAULT_PILEUP_WEIGHT_FIELD: &str = "pileup";

pub const OUTPUT_SERVICE_NAME: &str = "Output";
pub const JET_MET_UNIT_NAME: &str = "JetMET";
pub const PILEUP_WEIGHT_UNIT_NAME: &str = "PileUpWeight";
pub const RUN_FILTER_UNIT_NAME: &str = "RunFilter";
pub const TRIGGER_BIN_UNIT_NAME: &str = "TriggerBin";
pub const LEADING_JET_FILTER_UNIT_NAME: &str = "FirstJetFilter";
pub const TRIGGER_FILTER_UNIT_NAME: &str = "TriggerFilter";
