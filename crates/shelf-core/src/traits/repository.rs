// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence collaborators consumed by the provisioner and orchestrator.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ShelfError;
use crate::types::{Asset, AssetDraft, Category, PluginAttribute};

/// Everything the schema store needs to provision one plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSchema {
    pub plugin_id: String,
    pub category_name: String,
    pub category_description: String,
    pub attributes: Vec<PluginAttribute>,
}

/// What a provisioning transaction changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub category_id: i64,
    pub category_created: bool,
    pub attributes_created: Vec<String>,
    pub links_added: Vec<String>,
}

impl ProvisionReport {
    /// True when the call found everything already in place.
    pub fn is_noop(&self) -> bool {
        !self.category_created && self.attributes_created.is_empty() && self.links_added.is_empty()
    }
}

/// Result of removing a plugin's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeprovisionOutcome {
    /// No category existed for the plugin.
    NotProvisioned,
    /// Assets still reference the category; nothing was touched.
    Retained { category_id: i64, asset_count: i64 },
    /// Category and unreferenced plugin attributes were deleted.
    Removed {
        category_id: i64,
        attributes_removed: Vec<String>,
    },
}

/// Persisted enabled/disabled flag for a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPluginState {
    pub plugin_id: String,
    pub enabled: bool,
    pub category_id: Option<i64>,
}

/// Transactional store for plugin-managed categories and attributes.
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Create or reconcile the plugin's category, attributes, and links atomically.
    ///
    /// Fails with [`ShelfError::Conflict`] and leaves prior state untouched when an
    /// existing attribute has a different data type or is not owned by the plugin.
    async fn provision(&self, schema: &PluginSchema) -> Result<ProvisionReport, ShelfError>;

    /// Remove the plugin's category unless assets reference it.
    async fn deprovision(&self, plugin_id: &str) -> Result<DeprovisionOutcome, ShelfError>;

    async fn category_for_plugin(&self, plugin_id: &str) -> Result<Option<Category>, ShelfError>;

    async fn save_plugin_state(&self, plugin_id: &str, enabled: bool) -> Result<(), ShelfError>;

    async fn load_plugin_states(&self) -> Result<Vec<StoredPluginState>, ShelfError>;
}

/// The asset store. Only creation is needed by the import path.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn create_asset(&self, draft: &AssetDraft) -> Result<Asset, ShelfError>;
}
