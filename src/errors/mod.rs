// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod io;
mod run;
mod unit;

pub use config::{ConfigError, ValidationError, ValidationErrors};
pub use io::{SourceError, StoreError};
pub use run::{DatasetError, RunError, Stage};
pub use unit::UnitError;
