// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Shelf integration tests.
//!
//! Provides a scriptable adapter and a harness wiring it to a real,
//! temporary SQLite catalog, so import flows run without external services.
//!
//! # Components
//!
//! - [`StubPlugin`] - Adapter with canned results, call counters, delays, and failures
//! - [`TestHarness`] - Temp database + registry + [`shelf_import::ImportService`]

pub mod harness;
pub mod stub_plugin;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use stub_plugin::StubPlugin;
