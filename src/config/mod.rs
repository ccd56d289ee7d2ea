// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod loader;
mod registry;
mod runtime;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;
pub mod options;

pub use dependency_graph::{execution_order, DependencyGraph};
pub use loader::{
    load_and_validate_config, load_config, BalanceConfig, LeadingJetConfig, OutputConfig, RunConfig,
    RunFilterConfig,
};
pub use options::{parse_pt_cuts, DatasetGroup, SystKind, SystVariation, VarDirection};
pub use registry::Registration;
pub use runtime::PipelineBuilder;
pub use validation::validate_registrations;
