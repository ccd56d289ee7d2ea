// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the balance pipeline.
//!
//! Every diagnostic or operational log line is a message struct with a
//! `Display` implementation and a [`messages::StructuredLog`] implementation
//! that emits it with its fields attached, so log text lives in one place.
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - run and dataset lifecycle in the orchestrator
//! * `messages::unit` - per-unit lifecycle and event decisions
//! * `messages::validation` - preflight validation failures
//!
//! # Usage
//!
//! ```rust
//! use multijet_balance::observability::messages::engine::DatasetStarted;
//! use multijet_balance::observability::messages::StructuredLog;
//!
//! DatasetStarted {
//!     dataset: "QCD_Pt-15to7000",
//!     is_simulation: true,
//!     unit_count: 9,
//! }
//! .log();
//! ```

pub mod messages;
