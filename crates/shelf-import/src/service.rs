// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The import orchestrator.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use shelf_client::PacingTable;
use shelf_config::model::ServiceConfig;
use shelf_core::{
    Asset, AssetDraft, AssetRepository, DeprovisionOutcome, ImportPlugin, PluginStatus,
    PluginSummary, ProvisionReport, Provenance, SchemaRepository, SearchResult, ShelfError,
    coerce,
};
use shelf_plugin::{PluginEntry, PluginRegistry, PluginState};
use tracing::{debug, info, warn};

use crate::provisioner::Provisioner;

/// Request-handling knobs taken from `[service]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Upper bound on one adapter call, excluding time spent waiting for a pacing slot.
    pub request_timeout: Duration,
    pub default_search_limit: usize,
    pub max_search_limit: usize,
}

impl ServiceSettings {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            default_search_limit: config.default_search_limit,
            max_search_limit: config.max_search_limit,
        }
    }

    /// Zero means "use the default"; anything else is capped at the maximum.
    pub fn effective_limit(&self, requested: usize) -> usize {
        if requested == 0 {
            self.default_search_limit
        } else {
            requested.min(self.max_search_limit)
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

/// Coordinates the registry, adapters, provisioner, and asset store.
pub struct ImportService {
    registry: Arc<PluginRegistry>,
    provisioner: Provisioner,
    assets: Arc<dyn AssetRepository>,
    pacing: Arc<PacingTable>,
    settings: ServiceSettings,
}

impl std::fmt::Debug for ImportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportService")
            .field("plugins", &self.registry.ids())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ImportService {
    pub fn new(
        registry: Arc<PluginRegistry>,
        schema: Arc<dyn SchemaRepository>,
        assets: Arc<dyn AssetRepository>,
        pacing: Arc<PacingTable>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            registry,
            provisioner: Provisioner::new(schema),
            assets,
            pacing,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Load persisted plugin state into the registry.
    ///
    /// Plugins that come back enabled are re-provisioned so attributes added
    /// to their declaration since the last run get created and linked. A
    /// conflict is logged and leaves that plugin unprovisioned.
    pub async fn restore_state(&self) -> Result<(), ShelfError> {
        let stored = self.provisioner.repository().load_plugin_states().await?;
        self.registry.hydrate(&stored).await;

        for entry in self.registry.list() {
            let _guard = entry.lock_admin().await;
            if entry.state().await.status != PluginStatus::Enabled {
                continue;
            }
            match self.provisioner.enable(entry.plugin().as_ref()).await {
                Ok(report) => {
                    self.registry
                        .mark_enabled(entry.id(), report.category_id)
                        .await?;
                }
                Err(ShelfError::Conflict(message)) => {
                    warn!(
                        plugin_id = entry.id(),
                        %message,
                        "declared schema conflicts with catalog"
                    );
                    entry.set_state(PluginState::default()).await;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Every registered plugin with its current state, in id order.
    pub async fn list_plugins(&self) -> Vec<PluginSummary> {
        let mut summaries = Vec::with_capacity(self.registry.len());
        for entry in self.registry.list() {
            let plugin = entry.plugin();
            let state = entry.state().await;
            summaries.push(PluginSummary {
                id: plugin.id().to_string(),
                name: plugin.name().to_string(),
                description: plugin.description().to_string(),
                category_name: plugin.category_name().to_string(),
                search_fields: plugin.search_fields().to_vec(),
                enabled: state.accepts_requests(),
                status: state.status,
                category_id: state.category_id,
            });
        }
        summaries
    }

    /// Search a plugin's source. Results come back in upstream order.
    pub async fn search(
        &self,
        plugin_id: &str,
        field: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, ShelfError> {
        let entry = self.registry.entry(plugin_id)?;
        ensure_accepts(entry).await?;

        let plugin = entry.plugin();
        if !plugin.has_search_field(field) {
            let known: Vec<&str> = plugin.search_fields().iter().map(|f| f.key.as_str()).collect();
            return Err(ShelfError::Validation(format!(
                "unknown search field `{field}` for plugin `{plugin_id}` (expected one of: {})",
                known.join(", ")
            )));
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(ShelfError::Validation("search query must not be empty".into()));
        }
        let limit = self.settings.effective_limit(limit);

        let results = self
            .call_upstream(plugin_id, None, plugin.search(field, query, limit))
            .await?;
        debug!(plugin_id, field, limit, hits = results.len(), "search complete");
        Ok(results)
    }

    /// Fetch one external record and store it as a new asset.
    ///
    /// Provisions the plugin's schema first if that has not happened yet.
    /// Values under keys the plugin does not declare, and values that do not
    /// coerce to their declared type, are dropped.
    pub async fn import(&self, plugin_id: &str, external_id: &str) -> Result<Asset, ShelfError> {
        let entry = self.registry.entry(plugin_id)?;
        let state = ensure_accepts(entry).await?;

        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(ShelfError::Validation("external id must not be empty".into()));
        }

        if !matches!(
            (state.status, state.category_id),
            (PluginStatus::Enabled, Some(_))
        ) {
            self.provision_on_demand(entry).await?;
        }

        let plugin = entry.plugin();
        let data = self
            .call_upstream(plugin_id, Some(external_id), plugin.fetch(external_id))
            .await?;

        let name = data.name.trim();
        if name.is_empty() {
            let err = ShelfError::unavailable(plugin_id, "upstream record has no name");
            warn!(plugin_id, external_id, error = %err, "upstream call failed");
            return Err(err);
        }

        let mut attributes = BTreeMap::new();
        for (key, value) in &data.attributes {
            let Some(declared) = plugin.attribute(key) else {
                debug!(plugin_id, external_id, key = %key, "dropping undeclared attribute");
                continue;
            };
            match coerce(value, declared.data_type) {
                Ok(typed) => {
                    attributes.insert(key.clone(), typed);
                }
                Err(reason) => {
                    debug!(
                        plugin_id,
                        external_id,
                        key = %key,
                        data_type = %declared.data_type,
                        %reason,
                        "dropping attribute value that failed coercion"
                    );
                }
            }
        }

        // Disable or re-enable may have run while the fetch was in flight.
        let _guard = entry.lock_admin().await;
        let category_id = self.provision_locked(entry).await?;

        let draft = AssetDraft {
            name: name.to_string(),
            description: data.description.clone(),
            image_url: data.image_url.clone(),
            category_id: Some(category_id),
            quantity: 1,
            attributes,
            provenance: Some(Provenance {
                plugin_id: plugin_id.to_string(),
                external_id: external_id.to_string(),
            }),
        };
        let asset = self.assets.create_asset(&draft).await?;
        info!(
            plugin_id,
            external_id,
            asset_id = asset.id,
            category_id,
            attributes = asset.attributes.len(),
            "asset imported"
        );
        Ok(asset)
    }

    /// Provision a plugin's schema and mark it enabled.
    pub async fn enable(&self, plugin_id: &str) -> Result<ProvisionReport, ShelfError> {
        let entry = self.registry.entry(plugin_id)?;
        let _guard = entry.lock_admin().await;
        let report = self.provisioner.enable(entry.plugin().as_ref()).await?;
        self.registry.mark_enabled(plugin_id, report.category_id).await?;
        Ok(report)
    }

    /// Mark a plugin disabled, removing its schema when no asset uses it.
    pub async fn disable(&self, plugin_id: &str) -> Result<DeprovisionOutcome, ShelfError> {
        let entry = self.registry.entry(plugin_id)?;
        let _guard = entry.lock_admin().await;
        let outcome = self.provisioner.disable(plugin_id).await?;
        let retained = match &outcome {
            DeprovisionOutcome::Retained { category_id, .. } => Some(*category_id),
            DeprovisionOutcome::NotProvisioned | DeprovisionOutcome::Removed { .. } => None,
        };
        self.registry.mark_disabled(plugin_id, retained).await?;
        Ok(outcome)
    }

    /// Implicit enable on first import. Concurrent callers for the same
    /// plugin queue on its admin lock; all but the first find it done.
    async fn provision_on_demand(&self, entry: &PluginEntry) -> Result<i64, ShelfError> {
        let _guard = entry.lock_admin().await;
        self.provision_locked(entry).await
    }

    /// Current category id, provisioning if needed. Caller holds the admin lock.
    async fn provision_locked(&self, entry: &PluginEntry) -> Result<i64, ShelfError> {
        let state = entry.state().await;
        match (state.status, state.category_id) {
            (PluginStatus::Enabled, Some(id)) => return Ok(id),
            (PluginStatus::Disabled, _) => {
                return Err(ShelfError::DisabledPlugin {
                    plugin_id: entry.id().to_string(),
                });
            }
            _ => {}
        }
        debug!(plugin_id = entry.id(), "provisioning plugin on first import");
        let report = self.provisioner.enable(entry.plugin().as_ref()).await?;
        self.registry
            .mark_enabled(entry.id(), report.category_id)
            .await?;
        Ok(report.category_id)
    }

    /// Wait for the plugin's pacing slot, then run `call` under the request timeout.
    async fn call_upstream<T>(
        &self,
        plugin_id: &str,
        external_id: Option<&str>,
        call: impl Future<Output = Result<T, ShelfError>>,
    ) -> Result<T, ShelfError> {
        self.pacing.wait_turn(plugin_id).await;

        let outcome = match tokio::time::timeout(self.settings.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ShelfError::unavailable(
                plugin_id,
                format!(
                    "no response within {} ms",
                    self.settings.request_timeout.as_millis()
                ),
            )),
        };

        if let Err(err) = &outcome {
            if err.is_upstream_fault() {
                warn!(plugin_id, external_id, error = %err, "upstream call failed");
            }
        }
        outcome
    }
}

async fn ensure_accepts(entry: &PluginEntry) -> Result<PluginState, ShelfError> {
    let state = entry.state().await;
    if state.accepts_requests() {
        Ok(state)
    } else {
        Err(ShelfError::DisabledPlugin {
            plugin_id: entry.id().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use shelf_core::{
        AttributeValue, Category, DataType, ImportData, PluginAttribute, PluginSchema,
        SearchField, StoredPluginState, TypedValue,
    };
    use tracing_test::traced_test;

    struct CannedPlugin {
        attributes: Vec<PluginAttribute>,
        search_fields: Vec<SearchField>,
        record: ImportData,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl CannedPlugin {
        fn new() -> Self {
            let mut record = ImportData {
                external_id: "7".into(),
                name: "  Catan ".into(),
                ..Default::default()
            };
            record.set("games.players", Some("4"));
            record.set("games.rated", Some("maybe"));
            record.set("games.secret", Some("x"));
            Self {
                attributes: vec![
                    PluginAttribute::namespaced(
                        "games",
                        "games",
                        "players",
                        "Players",
                        DataType::Number,
                    ),
                    PluginAttribute::namespaced(
                        "games",
                        "games",
                        "rated",
                        "Rated",
                        DataType::Boolean,
                    ),
                ],
                search_fields: vec![SearchField::new("name", "Name")],
                record,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ImportPlugin for CannedPlugin {
        fn id(&self) -> &str {
            "games"
        }
        fn name(&self) -> &str {
            "Games"
        }
        fn description(&self) -> &str {
            "canned games"
        }
        fn category_name(&self) -> &str {
            "Games"
        }
        fn category_description(&self) -> &str {
            "Games from a canned source"
        }
        fn attributes(&self) -> &[PluginAttribute] {
            &self.attributes
        }
        fn search_fields(&self) -> &[SearchField] {
            &self.search_fields
        }
        async fn search(
            &self,
            _field: &str,
            query: &str,
            limit: usize,
        ) -> Result<Vec<SearchResult>, ShelfError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(vec![SearchResult {
                external_id: limit.to_string(),
                title: query.to_string(),
                subtitle: None,
                image_url: None,
            }])
        }
        async fn fetch(&self, _external_id: &str) -> Result<ImportData, ShelfError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.record.clone())
        }
    }

    #[derive(Default)]
    struct MemoryCatalog {
        provisions: AtomicUsize,
        category: Mutex<Option<i64>>,
        saved: Mutex<Vec<(String, bool)>>,
        drafts: Mutex<Vec<AssetDraft>>,
    }

    #[async_trait]
    impl SchemaRepository for MemoryCatalog {
        async fn provision(&self, schema: &PluginSchema) -> Result<ProvisionReport, ShelfError> {
            self.provisions.fetch_add(1, Ordering::SeqCst);
            let mut category = self.category.lock().unwrap();
            let created = category.is_none();
            let id = *category.get_or_insert(11);
            Ok(ProvisionReport {
                category_id: id,
                category_created: created,
                attributes_created: if created {
                    schema.attributes.iter().map(|a| a.key.clone()).collect()
                } else {
                    vec![]
                },
                links_added: vec![],
            })
        }

        async fn deprovision(&self, _plugin_id: &str) -> Result<DeprovisionOutcome, ShelfError> {
            let has_assets = !self.drafts.lock().unwrap().is_empty();
            let mut category = self.category.lock().unwrap();
            Ok(match (*category, has_assets) {
                (None, _) => DeprovisionOutcome::NotProvisioned,
                (Some(id), true) => DeprovisionOutcome::Retained {
                    category_id: id,
                    asset_count: 1,
                },
                (Some(id), false) => {
                    *category = None;
                    DeprovisionOutcome::Removed {
                        category_id: id,
                        attributes_removed: vec![],
                    }
                }
            })
        }

        async fn category_for_plugin(
            &self,
            _plugin_id: &str,
        ) -> Result<Option<Category>, ShelfError> {
            Ok(None)
        }

        async fn save_plugin_state(
            &self,
            plugin_id: &str,
            enabled: bool,
        ) -> Result<(), ShelfError> {
            self.saved.lock().unwrap().push((plugin_id.to_string(), enabled));
            Ok(())
        }

        async fn load_plugin_states(&self) -> Result<Vec<StoredPluginState>, ShelfError> {
            Ok(vec![StoredPluginState {
                plugin_id: "games".into(),
                enabled: true,
                category_id: Some(11),
            }])
        }
    }

    #[async_trait]
    impl AssetRepository for MemoryCatalog {
        async fn create_asset(&self, draft: &AssetDraft) -> Result<Asset, ShelfError> {
            let mut drafts = self.drafts.lock().unwrap();
            drafts.push(draft.clone());
            Ok(Asset {
                id: drafts.len() as i64,
                name: draft.name.clone(),
                description: draft.description.clone(),
                image_url: draft.image_url.clone(),
                category_id: draft.category_id,
                quantity: draft.quantity,
                attributes: draft.attributes.clone(),
                provenance: draft.provenance.clone(),
                created_at: "2026-01-01T00:00:00.000Z".into(),
            })
        }
    }

    fn service_with(
        plugin: CannedPlugin,
        settings: ServiceSettings,
    ) -> (ImportService, Arc<CannedPlugin>, Arc<MemoryCatalog>) {
        let plugin = Arc::new(plugin);
        let mut registry = PluginRegistry::new();
        registry.register(plugin.clone()).unwrap();
        let catalog = Arc::new(MemoryCatalog::default());
        let service = ImportService::new(
            Arc::new(registry),
            catalog.clone(),
            catalog.clone(),
            Arc::new(PacingTable::new()),
            settings,
        );
        (service, plugin, catalog)
    }

    fn service() -> (ImportService, Arc<CannedPlugin>, Arc<MemoryCatalog>) {
        service_with(CannedPlugin::new(), ServiceSettings::default())
    }

    #[test]
    fn limit_zero_uses_default_and_large_limits_are_capped() {
        let settings = ServiceSettings {
            request_timeout: Duration::from_secs(1),
            default_search_limit: 10,
            max_search_limit: 40,
        };
        assert_eq!(settings.effective_limit(0), 10);
        assert_eq!(settings.effective_limit(5), 5);
        assert_eq!(settings.effective_limit(500), 40);
    }

    #[tokio::test]
    async fn unknown_plugin_is_not_found() {
        let (service, _, _) = service();
        let err = service.search("nope", "name", "x", 1).await.unwrap_err();
        assert!(matches!(err, ShelfError::PluginNotFound { .. }));
        let err = service.import("nope", "1").await.unwrap_err();
        assert!(matches!(err, ShelfError::PluginNotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_field_and_blank_query_never_reach_the_adapter() {
        let (service, plugin, _) = service();
        let err = service.search("games", "isbn", "catan", 5).await.unwrap_err();
        assert!(matches!(err, ShelfError::Validation(ref m) if m.contains("isbn")));
        let err = service.search("games", "name", "   ", 5).await.unwrap_err();
        assert!(matches!(err, ShelfError::Validation(_)));
        assert_eq!(plugin.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_trims_query_and_clamps_limit() {
        let (service, _, _) = service();
        let results = service.search("games", "name", "  catan ", 1000).await.unwrap();
        assert_eq!(results[0].title, "catan");
        assert_eq!(results[0].external_id, "40");
    }

    #[tokio::test]
    async fn import_keeps_only_declared_coercible_values() {
        let (service, _, catalog) = service();
        let asset = service.import("games", " 7 ").await.unwrap();

        assert_eq!(asset.name, "Catan");
        assert_eq!(asset.quantity, 1);
        assert_eq!(asset.category_id, Some(11));
        assert_eq!(asset.import_plugin_id(), Some("games"));
        assert_eq!(asset.import_external_id(), Some("7"));
        assert_eq!(asset.attributes.len(), 1);
        assert_eq!(asset.attributes["games.players"], TypedValue::Number(4.0));

        let saved = catalog.saved.lock().unwrap().clone();
        assert_eq!(saved, vec![("games".to_string(), true)]);
    }

    #[tokio::test]
    async fn import_provisions_once() {
        let (service, _, catalog) = service();
        service.import("games", "7").await.unwrap();
        service.import("games", "7").await.unwrap();
        assert_eq!(catalog.provisions.load(Ordering::SeqCst), 1);

        let summary = &service.list_plugins().await[0];
        assert_eq!(summary.status, PluginStatus::Enabled);
        assert_eq!(summary.category_id, Some(11));
    }

    #[tokio::test]
    async fn blank_external_id_is_rejected() {
        let (service, plugin, catalog) = service();
        let err = service.import("games", "  ").await.unwrap_err();
        assert!(matches!(err, ShelfError::Validation(_)));
        assert_eq!(plugin.calls.load(Ordering::SeqCst), 0);
        assert_eq!(catalog.provisions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn nameless_record_is_unavailable() {
        let mut plugin = CannedPlugin::new();
        plugin.record.name = " ".into();
        let (service, _, catalog) = service_with(plugin, ServiceSettings::default());
        let err = service.import("games", "7").await.unwrap_err();
        assert!(matches!(err, ShelfError::Unavailable { .. }));
        assert!(catalog.drafts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_plugin_rejects_without_calls() {
        let (service, plugin, _) = service();
        let outcome = service.disable("games").await.unwrap();
        assert_eq!(outcome, DeprovisionOutcome::NotProvisioned);

        let err = service.search("games", "name", "catan", 5).await.unwrap_err();
        assert!(matches!(err, ShelfError::DisabledPlugin { .. }));
        let err = service.import("games", "7").await.unwrap_err();
        assert!(matches!(err, ShelfError::DisabledPlugin { .. }));
        assert_eq!(plugin.calls.load(Ordering::SeqCst), 0);

        let summary = &service.list_plugins().await[0];
        assert!(!summary.enabled);
        assert_eq!(summary.status, PluginStatus::Disabled);
    }

    #[tokio::test]
    async fn disable_with_assets_keeps_category_id() {
        let (service, _, _) = service();
        service.import("games", "7").await.unwrap();
        let outcome = service.disable("games").await.unwrap();
        assert!(matches!(outcome, DeprovisionOutcome::Retained { category_id: 11, .. }));
        assert_eq!(service.list_plugins().await[0].category_id, Some(11));

        service.enable("games").await.unwrap();
        assert!(service.list_plugins().await[0].enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn disable_during_fetch_rejects_the_import() {
        let mut plugin = CannedPlugin::new();
        plugin.delay = Duration::from_secs(5);
        let (service, _, catalog) = service_with(plugin, ServiceSettings::default());
        service.enable("games").await.unwrap();

        let (imported, disabled) = tokio::join!(service.import("games", "7"), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            service.disable("games").await
        });

        assert!(matches!(
            disabled.unwrap(),
            DeprovisionOutcome::Removed { category_id: 11, .. }
        ));
        assert!(matches!(
            imported.unwrap_err(),
            ShelfError::DisabledPlugin { .. }
        ));
        assert!(catalog.drafts.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reenable_during_fetch_uses_current_category() {
        let mut plugin = CannedPlugin::new();
        plugin.delay = Duration::from_secs(5);
        let (service, _, catalog) = service_with(plugin, ServiceSettings::default());
        service.enable("games").await.unwrap();

        let (imported, _) = tokio::join!(service.import("games", "7"), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            service.disable("games").await.unwrap();
            *catalog.category.lock().unwrap() = Some(12);
            service.enable("games").await.unwrap();
        });

        let asset = imported.unwrap();
        assert_eq!(asset.category_id, Some(12));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_adapter_times_out_as_unavailable() {
        let mut plugin = CannedPlugin::new();
        plugin.delay = Duration::from_secs(60);
        let settings = ServiceSettings {
            request_timeout: Duration::from_secs(2),
            ..ServiceSettings::default()
        };
        let (service, _, _) = service_with(plugin, settings);

        let started = tokio::time::Instant::now();
        let err = service.search("games", "name", "catan", 5).await.unwrap_err();
        assert!(matches!(err, ShelfError::Unavailable { .. }));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_wait_does_not_count_against_timeout() {
        let settings = ServiceSettings {
            request_timeout: Duration::from_secs(1),
            ..ServiceSettings::default()
        };
        let (service, _, _) = service_with(CannedPlugin::new(), settings);
        service.pacing.configure("games", Duration::from_secs(5));

        service.search("games", "name", "a", 1).await.unwrap();
        let started = tokio::time::Instant::now();
        service.search("games", "name", "b", 1).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn restore_state_reprovisions_enabled_plugins() {
        let (service, _, catalog) = service();
        service.restore_state().await.unwrap();
        assert_eq!(catalog.provisions.load(Ordering::SeqCst), 1);
        let summary = &service.list_plugins().await[0];
        assert_eq!(summary.status, PluginStatus::Enabled);
        assert_eq!(summary.category_id, Some(11));
    }

    #[tokio::test]
    #[traced_test]
    async fn dropped_values_are_logged_by_key() {
        let (service, _, _) = service();
        service.import("games", "7").await.unwrap();
        assert!(logs_contain("games.secret"));
        assert!(logs_contain("dropping undeclared attribute"));
        assert!(logs_contain("games.rated"));
    }

    #[test]
    fn attribute_values_from_record_are_loose() {
        let plugin = CannedPlugin::new();
        assert_eq!(
            plugin.record.attributes["games.players"],
            AttributeValue::Text("4".into())
        );
    }
}
