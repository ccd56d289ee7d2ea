// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod chain;
pub mod orchestrator;
pub mod summary;

pub use chain::UnitChain;
pub use orchestrator::Orchestrator;
pub use summary::{DatasetStatus, DatasetSummary, RunSummary, UnitRejections};
