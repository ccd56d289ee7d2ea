// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // run configuration + unit registrations
pub mod engine;     // dataset orchestrator
pub mod errors;     // error handling
pub mod io;         // event sources and output stores
pub mod model;      // physics objects and event state
pub mod observability;
pub mod plugins;    // processing units
pub mod traits;     // unit abstractions
