// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `engine` - orchestrator run and dataset events
//! * `unit` - unit lifecycle and event decisions
//! * `validation` - preflight validation failures

use tracing::Span;

pub mod engine;
pub mod unit;
pub mod validation;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its level with its fields attached.
    fn log(&self);

    /// A span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
