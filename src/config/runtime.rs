// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::consts::{
    JET_MET_UNIT_NAME, LEADING_JET_FILTER_UNIT_NAME, OUTPUT_SERVICE_NAME, PILEUP_WEIGHT_UNIT_NAME,
    RUN_FILTER_UNIT_NAME, TRIGGER_BIN_UNIT_NAME, TRIGGER_FILTER_UNIT_NAME,
};
use crate::config::loader::RunConfig;
use crate::config::options::DatasetGroup;
use crate::config::registry::Registration;
use crate::io::OutputStore;
use crate::plugins::{
    BalanceSources, BalanceVars, EventIdWriter, EventWeight, JetMetReader, LeadingJetFilter, RecoilBuilder,
    RecoilConfig, RunFilter, TableService, TriggerBin, TriggerFilter,
};

/// Pipeline builder - turns a validated run configuration into unit registrations.
///
/// The chain is the standard multijet balance analysis:
///
/// ```text
/// Output -> [RunFilter] -> JetMET -> [PileUpWeight] -> TriggerBin -> FirstJetFilter
///        -> TriggerFilter -> per pt cut: RecoilBuilderPt{T} -> [EventIDPt{T}] -> BalanceVarsPt{T}
/// ```
///
/// The run filter only applies to data with a configured boundary, the pileup
/// weight only to simulation, and event IDs are dumped for data only.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use multijet_balance::config::PipelineBuilder;
/// use multijet_balance::io::MemoryStore;
///
/// let config: multijet_balance::config::RunConfig = serde_yaml::from_str(
///     "dataset_group: sim\npt_cuts: [30]\ndatasets: []\n",
/// ).unwrap();
///
/// let registrations = PipelineBuilder::from_config(&config, Arc::new(MemoryStore::new()));
/// let names: Vec<&str> = registrations.iter().map(|r| r.name()).collect();
/// assert!(names.contains(&"BalanceVarsPt30"));
/// ```
pub struct PipelineBuilder;

impl PipelineBuilder {
    pub fn from_config(cfg: &RunConfig, store: Arc<dyn OutputStore>) -> Vec<Registration> {
        let is_data = cfg.dataset_group == DatasetGroup::Data;
        let mut registrations = Vec::new();

        registrations.push(Registration::new(Box::new(TableService::new(
            OUTPUT_SERVICE_NAME,
            store,
        ))));

        if let (true, Some(filter)) = (is_data, cfg.run_filter) {
            registrations.push(Registration::new(Box::new(RunFilter::new(
                RUN_FILTER_UNIT_NAME,
                filter.selection,
                filter.boundary,
            ))));
        }

        let reader = JetMetReader::new(JET_MET_UNIT_NAME)
            .with_selection(cfg.jets)
            .with_variation(cfg.syst);
        let mut reader = Registration::new(Box::new(reader));
        if is_data && cfg.run_filter.is_some() {
            reader = reader.after([RUN_FILTER_UNIT_NAME]);
        }
        registrations.push(reader);

        if !is_data {
            registrations.push(
                Registration::new(Box::new(EventWeight::new(
                    PILEUP_WEIGHT_UNIT_NAME,
                    cfg.pileup_weight_field.clone(),
                )))
                .after([JET_MET_UNIT_NAME]),
            );
        }

        registrations.push(Registration::new(Box::new(TriggerBin::new(
            TRIGGER_BIN_UNIT_NAME,
            JET_MET_UNIT_NAME,
            cfg.trigger_bins.clone(),
        ))));

        registrations.push(
            Registration::new(Box::new(LeadingJetFilter::new(
                LEADING_JET_FILTER_UNIT_NAME,
                JET_MET_UNIT_NAME,
                cfg.leading_jet.min_pt,
                cfg.leading_jet.max_abs_eta,
            )))
            .after([TRIGGER_BIN_UNIT_NAME]),
        );

        registrations.push(
            Registration::new(Box::new(TriggerFilter::new(
                TRIGGER_FILTER_UNIT_NAME,
                TRIGGER_BIN_UNIT_NAME,
                cfg.triggers.clone(),
            )))
            .after([LEADING_JET_FILTER_UNIT_NAME]),
        );

        let mut weights = vec![TRIGGER_FILTER_UNIT_NAME.to_string()];
        if !is_data {
            weights.push(PILEUP_WEIGHT_UNIT_NAME.to_string());
        }

        for cut in &cfg.pt_cuts {
            let builder_name = format!("RecoilBuilderPt{}", cut);
            let recoil = RecoilConfig {
                jet_pt_threshold: f64::from(*cut),
                selection: cfg.balance.selection,
                beta_pt_fraction: cfg.balance.beta_pt_fraction,
            };
            registrations.push(
                Registration::new(Box::new(RecoilBuilder::new(&builder_name, JET_MET_UNIT_NAME, recoil)))
                    .after([TRIGGER_FILTER_UNIT_NAME]),
            );

            if is_data {
                registrations.push(
                    Registration::new(Box::new(EventIdWriter::new(
                        format!("EventIDPt{}", cut),
                        OUTPUT_SERVICE_NAME,
                    )))
                    .after([builder_name.as_str()]),
                );
            }

            let sources = BalanceSources {
                recoil_builder: builder_name.clone(),
                trigger_bin: TRIGGER_BIN_UNIT_NAME.to_string(),
                output: OUTPUT_SERVICE_NAME.to_string(),
                weights: weights.clone(),
            };
            registrations.push(Registration::new(Box::new(BalanceVars::new(
                format!("BalanceVarsPt{}", cut),
                sources,
                cfg.corrections,
            ))));
        }

        registrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::execution_order;
    use crate::config::validate_registrations;
    use crate::io::MemoryStore;

    fn config(yaml: &str) -> RunConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn names(registrations: &[Registration]) -> Vec<&str> {
        registrations.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn test_simulation_chain() {
        let cfg = config("dataset_group: sim\npt_cuts: [30, 40]\ndatasets: []\n");
        let registrations = PipelineBuilder::from_config(&cfg, Arc::new(MemoryStore::new()));

        assert_eq!(
            names(&registrations),
            vec![
                "Output",
                "JetMET",
                "PileUpWeight",
                "TriggerBin",
                "FirstJetFilter",
                "TriggerFilter",
                "RecoilBuilderPt30",
                "BalanceVarsPt30",
                "RecoilBuilderPt40",
                "BalanceVarsPt40",
            ]
        );
        assert!(validate_registrations(&registrations).is_ok());
    }

    #[test]
    fn test_data_chain_with_run_filter() {
        let cfg = config(
            "dataset_group: data\npt_cuts: [30]\nrun_filter:\n  selection: greater_eq\n  boundary: 278802\ndatasets: []\n",
        );
        let registrations = PipelineBuilder::from_config(&cfg, Arc::new(MemoryStore::new()));

        assert_eq!(
            names(&registrations),
            vec![
                "Output",
                "RunFilter",
                "JetMET",
                "TriggerBin",
                "FirstJetFilter",
                "TriggerFilter",
                "RecoilBuilderPt30",
                "EventIDPt30",
                "BalanceVarsPt30",
            ]
        );
        assert!(validate_registrations(&registrations).is_ok());
    }

    #[test]
    fn test_jet_selection_is_copied_from_borrowed_config() {
        let cfg = config("dataset_group: sim
jets:
  min_pt: 15
  require_id: true
datasets: []
");
        let registrations = PipelineBuilder::from_config(&cfg, Arc::new(MemoryStore::new()));

        assert!(names(&registrations).contains(&"JetMET"));
        assert_eq!(cfg.jets.min_pt, 15.0);
        assert!(cfg.jets.require_id);
    }

    #[test]
    fn test_run_filter_ignored_for_simulation() {
        let cfg = config(
            "dataset_group: sim\nrun_filter:\n  selection: less\n  boundary: 278802\ndatasets: []\n",
        );
        let registrations = PipelineBuilder::from_config(&cfg, Arc::new(MemoryStore::new()));

        assert!(!names(&registrations).contains(&"RunFilter"));
    }

    #[test]
    fn test_resolved_order_keeps_registration_order() {
        let cfg = config("dataset_group: data\npt_cuts: [30, 50]\ndatasets: []\n");
        let registrations = PipelineBuilder::from_config(&cfg, Arc::new(MemoryStore::new()));

        let order = execution_order(&registrations).unwrap();
        assert_eq!(order, (0..registrations.len()).collect::<Vec<_>>());
    }
}
