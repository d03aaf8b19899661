// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams of the import system.
//!
//! Adapters implement [`ImportPlugin`]; persistence backends implement the
//! repository traits. All use `#[async_trait]` for dynamic dispatch.

pub mod plugin;
pub mod repository;

pub use plugin::ImportPlugin;
pub use repository::{
    AssetRepository, DeprovisionOutcome, PluginSchema, ProvisionReport, SchemaRepository,
    StoredPluginState,
};
