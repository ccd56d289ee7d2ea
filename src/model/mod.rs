// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Physics objects and per-event state shared by every processing unit.

mod dataset;
mod event;
mod jet;
mod kinematics;

pub use dataset::Dataset;
pub use event::{EventContext, EventId, EventRecord};
pub use jet::Jet;
pub use kinematics::Vector2;
