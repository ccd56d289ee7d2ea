// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for unit lifecycle events and per-event decisions.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A unit resolved its dependencies and is ready for a dataset.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct UnitRunStarted<'a> {
    pub unit: &'a str,
    pub dataset: &'a str,
}

impl Display for UnitRunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unit '{}' started run on '{}'", self.unit, self.dataset)
    }
}

impl StructuredLog for UnitRunStarted<'_> {
    fn log(&self) {
        tracing::debug!(unit = self.unit, dataset = self.dataset, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("unit_run", span_name = name, unit = self.unit, dataset = self.dataset)
    }
}

/// A unit opened an output table.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct TableOpened<'a> {
    pub unit: &'a str,
    pub table: &'a str,
    pub column_count: usize,
}

impl Display for TableOpened<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' opened table '{}' with {} columns",
            self.unit, self.table, self.column_count
        )
    }
}

impl StructuredLog for TableOpened<'_> {
    fn log(&self) {
        tracing::debug!(
            unit = self.unit,
            table = self.table,
            column_count = self.column_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("table", span_name = name, unit = self.unit, table = self.table)
    }
}

/// A unit rejected an event.
///
/// # Log Level
/// `trace!` - Emitted once per rejected event
pub struct EventRejected<'a> {
    pub unit: &'a str,
    pub event: u64,
    pub reason: &'a str,
}

impl Display for EventRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unit '{}' rejected event #{}: {}", self.unit, self.event, self.reason)
    }
}

impl StructuredLog for EventRejected<'_> {
    fn log(&self) {
        tracing::trace!(
            unit = self.unit,
            event = self.event,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("event_rejected", span_name = name, unit = self.unit, event = self.event)
    }
}

/// A unit finished its run.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct UnitRunFinished<'a> {
    pub unit: &'a str,
    pub events_seen: u64,
    pub events_rejected: u64,
}

impl Display for UnitRunFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' finished: saw {} events, rejected {}",
            self.unit, self.events_seen, self.events_rejected
        )
    }
}

impl StructuredLog for UnitRunFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            unit = self.unit,
            events_seen = self.events_seen,
            events_rejected = self.events_rejected,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("unit_finished", span_name = name, unit = self.unit)
    }
}
