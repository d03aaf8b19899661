// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry and built-in adapter catalog.
//!
//! Adapters are compiled in; the catalog constructs the ones enabled in
//! configuration and registers them once at startup. The registry then
//! tracks each plugin's provisioning status for the lifetime of the process.

pub mod catalog;
pub mod registry;

pub use catalog::builtin_catalog;
pub use registry::{PluginEntry, PluginRegistry, PluginState};
