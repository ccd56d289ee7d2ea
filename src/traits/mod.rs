// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod providers;
pub mod registry;
pub mod unit;

pub use providers::{OutputService, RecoilProvider};
pub use registry::{UnitHandle, UnitRegistry};
pub use unit::{Capability, Decision, Requirement, Unit, UnitKind};
