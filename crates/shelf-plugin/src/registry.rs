// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of compiled-in import plugins.
//!
//! The `PluginRegistry` stores one `PluginEntry` per plugin id. Entries are
//! fixed after startup; only each entry's [`PluginState`] changes, behind a
//! lock owned by that entry, so state changes for one plugin never block
//! another.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use shelf_core::{ImportPlugin, PluginStatus, ShelfError, StoredPluginState};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

/// Mutable per-plugin state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginState {
    pub status: PluginStatus,
    /// Cached id of the plugin's provisioned category.
    pub category_id: Option<i64>,
}

impl Default for PluginState {
    fn default() -> Self {
        Self {
            status: PluginStatus::Unprovisioned,
            category_id: None,
        }
    }
}

impl PluginState {
    /// Whether the plugin accepts search and import requests.
    pub fn accepts_requests(&self) -> bool {
        self.status != PluginStatus::Disabled
    }
}

/// A single registered plugin.
pub struct PluginEntry {
    plugin: Arc<dyn ImportPlugin>,
    state: RwLock<PluginState>,
    /// Serializes schema changes (enable, disable, auto-provision) for this plugin.
    admin: Mutex<()>,
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("id", &self.plugin.id())
            .field("category", &self.plugin.category_name())
            .finish()
    }
}

impl PluginEntry {
    fn new(plugin: Arc<dyn ImportPlugin>) -> Self {
        Self {
            plugin,
            state: RwLock::new(PluginState::default()),
            admin: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        self.plugin.id()
    }

    pub fn plugin(&self) -> &Arc<dyn ImportPlugin> {
        &self.plugin
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> PluginState {
        *self.state.read().await
    }

    pub async fn set_state(&self, state: PluginState) {
        *self.state.write().await = state;
    }

    /// Acquire the per-plugin administrative lock.
    pub async fn lock_admin(&self) -> MutexGuard<'_, ()> {
        self.admin.lock().await
    }
}

/// Registry of compiled-in import plugins, iterated in plugin id order.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: BTreeMap<String, PluginEntry>,
    /// Attribute key to owning plugin id, across all registered plugins.
    keys: HashMap<String, String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin.
    ///
    /// Rejects a duplicate id or category slug, an attribute key outside the
    /// plugin's `"<slug>."` namespace, and a key already declared by any
    /// registered plugin.
    pub fn register(&mut self, plugin: Arc<dyn ImportPlugin>) -> Result<(), ShelfError> {
        let id = plugin.id().to_string();
        if id.trim().is_empty() {
            return Err(ShelfError::Config("plugin id must not be empty".into()));
        }
        if self.entries.contains_key(&id) {
            return Err(ShelfError::Config(format!("duplicate plugin id `{id}`")));
        }

        let slug = plugin.category_slug();
        if slug.is_empty() {
            return Err(ShelfError::Config(format!(
                "plugin `{id}` has a category name without alphanumerics"
            )));
        }
        if let Some(other) = self
            .entries
            .values()
            .find(|e| e.plugin.category_slug() == slug)
        {
            return Err(ShelfError::Config(format!(
                "plugin `{id}` reuses category slug `{slug}` of plugin `{}`",
                other.id()
            )));
        }

        let prefix = format!("{slug}.");
        let mut declared: HashMap<String, String> = HashMap::new();
        for attr in plugin.attributes() {
            let local = attr.key.strip_prefix(&prefix).unwrap_or_default();
            if local.is_empty() {
                return Err(ShelfError::Config(format!(
                    "plugin `{id}` declares attribute `{}` outside namespace `{prefix}`",
                    attr.key
                )));
            }
            if attr.plugin_id != id {
                return Err(ShelfError::Config(format!(
                    "attribute `{}` of plugin `{id}` names owner `{}`",
                    attr.key, attr.plugin_id
                )));
            }
            if let Some(owner) = self.keys.get(&attr.key).or_else(|| declared.get(&attr.key)) {
                return Err(ShelfError::Config(format!(
                    "attribute key `{}` already declared by plugin `{owner}`",
                    attr.key
                )));
            }
            declared.insert(attr.key.clone(), id.clone());
        }

        debug!(plugin_id = %id, attributes = declared.len(), "plugin registered");
        self.keys.extend(declared);
        self.entries.insert(id, PluginEntry::new(plugin));
        Ok(())
    }

    pub fn get(&self, plugin_id: &str) -> Option<&PluginEntry> {
        self.entries.get(plugin_id)
    }

    /// Look up an entry, failing with [`ShelfError::PluginNotFound`].
    pub fn entry(&self, plugin_id: &str) -> Result<&PluginEntry, ShelfError> {
        self.entries
            .get(plugin_id)
            .ok_or_else(|| ShelfError::PluginNotFound {
                plugin_id: plugin_id.to_string(),
            })
    }

    /// All entries, sorted by plugin id.
    pub fn list(&self) -> impl Iterator<Item = &PluginEntry> {
        self.entries.values()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// True when the plugin is registered and not disabled.
    pub async fn is_enabled(&self, plugin_id: &str) -> bool {
        match self.entries.get(plugin_id) {
            Some(entry) => entry.state().await.accepts_requests(),
            None => false,
        }
    }

    pub async fn mark_enabled(&self, plugin_id: &str, category_id: i64) -> Result<(), ShelfError> {
        self.entry(plugin_id)?
            .set_state(PluginState {
                status: PluginStatus::Enabled,
                category_id: Some(category_id),
            })
            .await;
        Ok(())
    }

    /// Mark disabled. `category_id` is the retained category, if any.
    pub async fn mark_disabled(
        &self,
        plugin_id: &str,
        category_id: Option<i64>,
    ) -> Result<(), ShelfError> {
        self.entry(plugin_id)?
            .set_state(PluginState {
                status: PluginStatus::Disabled,
                category_id,
            })
            .await;
        Ok(())
    }

    /// Load persisted state at startup. Unknown plugin ids are skipped.
    pub async fn hydrate(&self, states: &[StoredPluginState]) {
        for stored in states {
            let Some(entry) = self.entries.get(&stored.plugin_id) else {
                warn!(
                    plugin_id = %stored.plugin_id,
                    "persisted state for unregistered plugin ignored"
                );
                continue;
            };
            let status = match (stored.enabled, stored.category_id) {
                (false, _) => PluginStatus::Disabled,
                (true, Some(_)) => PluginStatus::Enabled,
                // Enabled but the category is gone; provision again on next use.
                (true, None) => PluginStatus::Unprovisioned,
            };
            entry
                .set_state(PluginState {
                    status,
                    category_id: stored.category_id,
                })
                .await;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
