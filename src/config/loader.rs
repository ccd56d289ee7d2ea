// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::consts::{
    DEFAULT_BETA_PT_FRACTION, DEFAULT_LEADING_JET_MAX_ABS_ETA, DEFAULT_LEADING_JET_MIN_PT,
    DEFAULT_PILEUP_WEIGHT_FIELD, DEFAULT_PT_CUTS, DEFAULT_TRIGGER_BIN_EDGES, DEFAULT_TRIGGER_PATHS,
};
use crate::config::options::{DatasetGroup, SystVariation};
use crate::errors::ConfigError;
use crate::model::Dataset;
use crate::plugins::{BalanceSelection, Corrections, JetSelection, RunSelection, TriggerPath};

/// Complete configuration of a multijet balance run.
///
/// Everything but `dataset_group` and `datasets` has a default matching the
/// standard analysis.
///
/// # Example
/// ```yaml
/// dataset_group: sim
/// pt_cuts: [30, 40]
/// syst: jec-up
/// workers: 4
/// output:
///   kind: csv
///   directory: output
/// leading_jet:
///   max_abs_eta: 1.3
/// datasets:
///   - name: QCD-Ht-700-1000
///     is_simulation: true
///     cross_section: 6831
///     generated_events: 15629253
///     files: ["input/QCD-Ht-700-1000.jsonl"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub dataset_group: DatasetGroup,
    /// Recoil jet pt thresholds; one recoil builder and writer per value.
    #[serde(default = "default_pt_cuts")]
    pub pt_cuts: Vec<u32>,
    #[serde(default)]
    pub syst: SystVariation,
    /// Parallel dataset workers; defaults to the available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_trigger_bins")]
    pub trigger_bins: Vec<f64>,
    /// One path per trigger bin.
    #[serde(default = "default_triggers")]
    pub triggers: Vec<TriggerPath>,
    #[serde(default)]
    pub leading_jet: LeadingJetConfig,
    #[serde(default)]
    pub balance: BalanceConfig,
    #[serde(default)]
    pub corrections: Corrections,
    #[serde(default)]
    pub run_filter: Option<RunFilterConfig>,
    #[serde(default)]
    pub jets: JetSelection,
    #[serde(default = "default_pileup_weight_field")]
    pub pileup_weight_field: String,
    pub datasets: Vec<Dataset>,
}

fn default_pt_cuts() -> Vec<u32> {
    DEFAULT_PT_CUTS.to_vec()
}

fn default_trigger_bins() -> Vec<f64> {
    DEFAULT_TRIGGER_BIN_EDGES.to_vec()
}

fn default_triggers() -> Vec<TriggerPath> {
    DEFAULT_TRIGGER_PATHS
        .iter()
        .map(|name| TriggerPath::new(*name, 1.0))
        .collect()
}

fn default_pileup_weight_field() -> String {
    DEFAULT_PILEUP_WEIGHT_FIELD.to_string()
}

/// Where output tables go.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputConfig {
    /// Keep tables in memory; only the summary is reported.
    Memory,
    /// One CSV file per dataset and table under `directory`.
    Csv { directory: PathBuf },
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig::Csv {
            directory: PathBuf::from("output"),
        }
    }
}

fn default_leading_min_pt() -> f64 {
    DEFAULT_LEADING_JET_MIN_PT
}

fn default_leading_max_abs_eta() -> f64 {
    DEFAULT_LEADING_JET_MAX_ABS_ETA
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LeadingJetConfig {
    #[serde(default = "default_leading_min_pt")]
    pub min_pt: f64,
    #[serde(default = "default_leading_max_abs_eta")]
    pub max_abs_eta: f64,
}

impl Default for LeadingJetConfig {
    fn default() -> Self {
        Self {
            min_pt: DEFAULT_LEADING_JET_MIN_PT,
            max_abs_eta: DEFAULT_LEADING_JET_MAX_ABS_ETA,
        }
    }
}

fn default_beta_pt_fraction() -> f64 {
    DEFAULT_BETA_PT_FRACTION
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BalanceConfig {
    #[serde(flatten)]
    pub selection: BalanceSelection,
    #[serde(default = "default_beta_pt_fraction")]
    pub beta_pt_fraction: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            selection: BalanceSelection::default(),
            beta_pt_fraction: DEFAULT_BETA_PT_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RunFilterConfig {
    pub selection: RunSelection,
    pub boundary: u32,
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            reason: format!("expected a finite non-negative number, got {}", value),
        })
    }
}

impl RunConfig {
    /// Number of dataset workers to run.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// Datasets of the configured group, in configuration order.
    pub fn selected_datasets(&self) -> Vec<Dataset> {
        let want_simulation = self.dataset_group == DatasetGroup::Simulation;
        self.datasets
            .iter()
            .filter(|d| d.is_simulation() == want_simulation)
            .cloned()
            .collect()
    }

    /// Check every value of the configuration surface.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pt_cuts.is_empty() {
            return Err(ConfigError::NoPtCuts);
        }
        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkerCount(0));
        }

        let edges_ok = !self.trigger_bins.is_empty()
            && self.trigger_bins.iter().all(|e| e.is_finite())
            && self.trigger_bins.windows(2).all(|w| w[0] < w[1]);
        if !edges_ok {
            return Err(ConfigError::InvalidTriggerEdges);
        }
        if self.triggers.len() != self.trigger_bins.len() {
            return Err(ConfigError::TriggerPathCount {
                paths: self.triggers.len(),
                bins: self.trigger_bins.len(),
            });
        }
        for path in &self.triggers {
            non_negative("trigger luminosity", path.luminosity)?;
        }

        non_negative("leading jet min_pt", self.leading_jet.min_pt)?;
        non_negative("leading jet max_abs_eta", self.leading_jet.max_abs_eta)?;
        non_negative("max_a", self.balance.selection.max_a)?;
        non_negative("max_alpha", self.balance.selection.max_alpha)?;
        non_negative("max_beta", self.balance.selection.max_beta)?;
        non_negative("beta_pt_fraction", self.balance.beta_pt_fraction)?;

        for slope in [self.corrections.linear.slope(), self.corrections.log_linear.slope()] {
            if !(slope.is_finite() && slope > 0.0) {
                return Err(ConfigError::InvalidValue {
                    name: "correction slope",
                    reason: format!("expected a finite positive number, got {}", slope),
                });
            }
        }

        let mut names = HashSet::new();
        for dataset in &self.datasets {
            if !names.insert(dataset.name()) {
                return Err(ConfigError::InvalidValue {
                    name: "dataset name",
                    reason: format!("'{}' is used twice", dataset.name()),
                });
            }
        }

        let selected = self.selected_datasets();
        if selected.is_empty() {
            return Err(ConfigError::NoDatasets(self.dataset_group.to_string()));
        }
        for dataset in selected.iter().filter(|d| d.is_simulation()) {
            let normalized = matches!(dataset.cross_section(), Some(x) if x.is_finite() && x > 0.0)
                && matches!(dataset.generated_events(), Some(n) if n > 0);
            if !normalized {
                return Err(ConfigError::MissingNormalization(dataset.name().to_string()));
            }
        }

        Ok(())
    }
}

/// Load a run configuration from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: RunConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a run configuration and check all of its values.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}
