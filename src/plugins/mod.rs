// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Processing units of the balance pipeline.
//!
//! * [`TableService`] - output tables for the current dataset
//! * [`JetMetReader`] - jets and missing energy, with systematic variations
//! * [`RunFilter`], [`TriggerBin`], [`LeadingJetFilter`], [`TriggerFilter`] - event selection
//! * [`EventWeight`] - per-event weights from the record
//! * [`RecoilBuilder`] - recoil reconstruction and balance selection
//! * [`BalanceVars`], [`EventIdWriter`] - output writers

mod balance_vars;
mod event_id;
mod event_weight;
mod jet_met_reader;
mod leading_jet_filter;
mod output_service;
mod recoil_builder;
mod run_filter;
mod trigger_bin;
mod trigger_filter;

#[cfg(test)]
pub mod stub;

pub use balance_vars::{
    balance_observables, BalanceObservables, BalanceSources, BalanceVars, CorrectionTransform, Corrections,
    BALANCE_COLUMNS,
};
pub use event_id::{EventIdWriter, EVENT_ID_COLUMNS};
pub use event_weight::EventWeight;
pub use jet_met_reader::{JetMetReader, JetSelection};
pub use leading_jet_filter::LeadingJetFilter;
pub use output_service::TableService;
pub use recoil_builder::{build_recoil, BalanceSelection, RecoilBuilder, RecoilConfig, RecoilRejection, RecoilResult};
pub use run_filter::{RunFilter, RunSelection};
pub use trigger_bin::TriggerBin;
pub use trigger_filter::{TriggerFilter, TriggerPath};
