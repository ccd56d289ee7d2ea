// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed values of the run configuration surface: dataset group, systematic
//! variation and jet pt cuts.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::ConfigError;

/// Which datasets of the configuration are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum DatasetGroup {
    Data,
    Simulation,
}

impl FromStr for DatasetGroup {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(DatasetGroup::Data),
            "mc" | "sim" => Ok(DatasetGroup::Simulation),
            _ => Err(ConfigError::UnknownDatasetGroup(s.to_string())),
        }
    }
}

impl TryFrom<String> for DatasetGroup {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for DatasetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetGroup::Data => write!(f, "data"),
            DatasetGroup::Simulation => write!(f, "sim"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystKind {
    /// Jet energy correction scale
    Jec,
    /// Jet energy resolution smearing
    Jer,
    /// Unclustered contribution to missing energy
    MetUnclustered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDirection {
    Up,
    Down,
}

impl VarDirection {
    pub fn sign(&self) -> f64 {
        match self {
            VarDirection::Up => 1.0,
            VarDirection::Down => -1.0,
        }
    }
}

/// Systematic variation applied to jets and missing energy in simulation.
///
/// Parsed from `none` or `<kind>[-_]<direction>` with kind one of `jec`,
/// `jer`, `metuncl` and direction `up` or `down`, case-insensitive; the
/// separator is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum SystVariation {
    #[default]
    None,
    Shift {
        kind: SystKind,
        direction: VarDirection,
    },
}

impl FromStr for SystVariation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();

        if lowered == "none" {
            return Ok(SystVariation::None);
        }

        let (kind, rest) = [
            ("metuncl", SystKind::MetUnclustered),
            ("jec", SystKind::Jec),
            ("jer", SystKind::Jer),
        ]
        .iter()
        .find_map(|(prefix, kind)| lowered.strip_prefix(prefix).map(|rest| (*kind, rest)))
        .ok_or_else(|| ConfigError::UnknownSystematic(s.to_string()))?;

        let rest = rest
            .strip_prefix('-')
            .or_else(|| rest.strip_prefix('_'))
            .unwrap_or(rest);

        let direction = match rest {
            "up" => VarDirection::Up,
            "down" => VarDirection::Down,
            _ => return Err(ConfigError::UnknownSystematic(s.to_string())),
        };

        Ok(SystVariation::Shift { kind, direction })
    }
}

impl TryFrom<String> for SystVariation {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SystVariation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystVariation::None => write!(f, "None"),
            SystVariation::Shift { kind, direction } => {
                let kind = match kind {
                    SystKind::Jec => "JEC",
                    SystKind::Jer => "JER",
                    SystKind::MetUnclustered => "METUncl",
                };
                let direction = match direction {
                    VarDirection::Up => "up",
                    VarDirection::Down => "down",
                };
                write!(f, "{}_{}", kind, direction)
            }
        }
    }
}

/// Parse a comma-separated list of integer jet pt cuts, e.g. `"30,50"`.
pub fn parse_pt_cuts(text: &str) -> Result<Vec<u32>, ConfigError> {
    let cuts = text
        .split(',')
        .map(|cut| {
            cut.trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidPtCut(cut.trim().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if cuts.is_empty() {
        return Err(ConfigError::NoPtCuts);
    }
    Ok(cuts)
}
