// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciles a plugin's declared schema with the persisted catalog.

use std::sync::Arc;

use shelf_core::{
    DeprovisionOutcome, ImportPlugin, PluginSchema, ProvisionReport, SchemaRepository, ShelfError,
};
use tracing::info;

/// Build the provisioning request for a plugin from its static declaration.
pub fn plugin_schema(plugin: &dyn ImportPlugin) -> PluginSchema {
    PluginSchema {
        plugin_id: plugin.id().to_string(),
        category_name: plugin.category_name().to_string(),
        category_description: plugin.category_description().to_string(),
        attributes: plugin.attributes().to_vec(),
    }
}

/// Creates and removes plugin-owned categories and attributes.
///
/// Callers serialize calls for one plugin (see `PluginEntry::lock_admin`);
/// the repository's transaction handles races with other processes.
#[derive(Clone)]
pub struct Provisioner {
    schema: Arc<dyn SchemaRepository>,
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner").finish_non_exhaustive()
    }
}

impl Provisioner {
    pub fn new(schema: Arc<dyn SchemaRepository>) -> Self {
        Self { schema }
    }

    pub fn repository(&self) -> &Arc<dyn SchemaRepository> {
        &self.schema
    }

    /// Provision the plugin's schema and persist it as enabled.
    ///
    /// Idempotent. A [`ShelfError::Conflict`] leaves both the catalog and the
    /// persisted flag as they were.
    pub async fn enable(&self, plugin: &dyn ImportPlugin) -> Result<ProvisionReport, ShelfError> {
        let report = self.schema.provision(&plugin_schema(plugin)).await?;
        self.schema.save_plugin_state(plugin.id(), true).await?;

        if report.is_noop() {
            info!(
                plugin_id = plugin.id(),
                category_id = report.category_id,
                "plugin schema already provisioned"
            );
        } else {
            info!(
                plugin_id = plugin.id(),
                category_id = report.category_id,
                category_created = report.category_created,
                attributes_created = ?report.attributes_created,
                links_added = ?report.links_added,
                "plugin schema provisioned"
            );
        }
        Ok(report)
    }

    /// Remove the plugin's schema if no asset uses it, and persist it as disabled.
    pub async fn disable(&self, plugin_id: &str) -> Result<DeprovisionOutcome, ShelfError> {
        let outcome = self.schema.deprovision(plugin_id).await?;
        self.schema.save_plugin_state(plugin_id, false).await?;

        match &outcome {
            DeprovisionOutcome::NotProvisioned => {
                info!(plugin_id, "plugin disabled; nothing was provisioned");
            }
            DeprovisionOutcome::Retained {
                category_id,
                asset_count,
            } => {
                info!(
                    plugin_id,
                    category_id, asset_count, "plugin disabled; category kept for existing assets"
                );
            }
            DeprovisionOutcome::Removed {
                category_id,
                attributes_removed,
            } => {
                info!(
                    plugin_id,
                    category_id,
                    attributes_removed = ?attributes_removed,
                    "plugin disabled; schema removed"
                );
            }
        }
        Ok(outcome)
    }
}
