// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::{
    load_and_validate_config, validate_registrations, DatasetGroup, OutputConfig, PipelineBuilder,
    SystVariation,
};
use crate::io::MemoryStore;

/// The simulation config loads, selects only simulated datasets and builds a valid chain.
#[test]
fn test_simulation_yaml_loading() {
    let config = load_and_validate_config("configs/multijet-sim.yaml").unwrap();

    assert_eq!(config.dataset_group, DatasetGroup::Simulation);
    assert_eq!(config.pt_cuts, vec![30]);
    assert_eq!(config.syst, SystVariation::None);
    assert_eq!(config.worker_count(), 2);
    assert_eq!(config.datasets.len(), 3);

    let selected: Vec<String> = config
        .selected_datasets()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    assert_eq!(selected, vec!["QCD-Ht-700-1000", "QCD-Ht-1000-1500"]);
    assert!(matches!(config.output, OutputConfig::Csv { .. }));
}

#[test]
fn test_data_yaml_loading() {
    let config = load_and_validate_config("configs/multijet-data.yaml").unwrap();

    assert_eq!(config.dataset_group, DatasetGroup::Data);
    assert_eq!(config.pt_cuts, vec![30, 40]);
    assert_eq!(config.triggers.len(), config.trigger_bins.len());
    assert!(config.triggers.iter().all(|t| t.luminosity == 1.0));
    assert_eq!(config.run_filter.map(|f| f.boundary), Some(278_802));
    assert_eq!(config.selected_datasets().len(), 2);
}

#[test]
fn test_pipelines_from_yaml_are_valid() {
    for path in ["configs/multijet-sim.yaml", "configs/multijet-data.yaml"] {
        let config = load_and_validate_config(path).unwrap();
        let registrations = PipelineBuilder::from_config(&config, Arc::new(MemoryStore::new()));

        assert!(
            validate_registrations(&registrations).is_ok(),
            "pipeline from '{}' failed validation",
            path
        );

        let writers = registrations
            .iter()
            .filter(|r| r.name().starts_with("BalanceVarsPt"))
            .count();
        assert_eq!(writers, config.pt_cuts.len(), "writer count for '{}'", path);
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_and_validate_config("configs/does-not-exist.yaml");
    assert!(matches!(result, Err(crate::errors::ConfigError::Io { .. })));
}
