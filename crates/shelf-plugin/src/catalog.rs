// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in adapter catalog.
//!
//! Constructs the compiled-in adapters that configuration leaves enabled,
//! registers them, and installs each one's pacing gate. No network calls
//! are made.

use std::sync::Arc;
use std::time::Duration;

use shelf_bgg::BggPlugin;
use shelf_client::PacingTable;
use shelf_config::ShelfConfig;
use shelf_core::{ImportPlugin, ShelfError};
use shelf_googlebooks::GoogleBooksPlugin;
use shelf_tmdb::TmdbPlugin;
use tracing::{info, warn};

use crate::registry::PluginRegistry;

/// Build the registry of built-in plugins.
///
/// The catalog contains up to three adapters:
/// - googlebooks (JSON, optional API key)
/// - tmdb (JSON, bearer token)
/// - bgg (XML, paced)
///
/// A plugin with `enabled = false` in configuration is not constructed at all.
pub fn builtin_catalog(
    config: &ShelfConfig,
    pacing: &PacingTable,
) -> Result<PluginRegistry, ShelfError> {
    let timeout = Duration::from_secs(config.service.request_timeout_secs);
    let plugins = &config.plugins;
    let mut registry = PluginRegistry::new();

    if plugins.googlebooks.enabled {
        let plugin = GoogleBooksPlugin::new(&plugins.googlebooks, timeout)?;
        add(&mut registry, pacing, Arc::new(plugin), plugins.googlebooks.min_interval_ms)?;
    } else {
        info!(plugin_id = shelf_googlebooks::PLUGIN_ID, "plugin disabled in configuration");
    }

    if plugins.tmdb.enabled {
        if plugins.tmdb.api_token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            warn!(
                plugin_id = shelf_tmdb::PLUGIN_ID,
                "no api_token configured; requests will be rejected as unauthorized"
            );
        }
        let plugin = TmdbPlugin::new(&plugins.tmdb, timeout)?;
        add(&mut registry, pacing, Arc::new(plugin), plugins.tmdb.min_interval_ms)?;
    } else {
        info!(plugin_id = shelf_tmdb::PLUGIN_ID, "plugin disabled in configuration");
    }

    if plugins.bgg.enabled {
        let plugin = BggPlugin::new(&plugins.bgg, timeout)?;
        add(&mut registry, pacing, Arc::new(plugin), plugins.bgg.min_interval_ms)?;
    } else {
        info!(plugin_id = shelf_bgg::PLUGIN_ID, "plugin disabled in configuration");
    }

    info!(plugins = ?registry.ids(), "plugin catalog loaded");
    Ok(registry)
}

fn add(
    registry: &mut PluginRegistry,
    pacing: &PacingTable,
    plugin: Arc<dyn ImportPlugin>,
    min_interval_ms: u64,
) -> Result<(), ShelfError> {
    pacing.configure(plugin.id(), Duration::from_millis(min_interval_ms));
    registry.register(plugin)
}
