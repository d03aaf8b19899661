// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end import tests.
//!
//! `TestHarness` assembles a registry holding one [`StubPlugin`], a temp
//! SQLite catalog, and an [`ImportService`] over both.

use std::sync::Arc;
use std::time::Duration;

use shelf_client::PacingTable;
use shelf_config::model::StorageConfig;
use shelf_core::{ImportPlugin, ShelfError};
use shelf_import::{ImportService, ServiceSettings};
use shelf_plugin::PluginRegistry;
use shelf_storage::SqliteCatalog;

use crate::stub_plugin::StubPlugin;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    stub: StubPlugin,
    settings: ServiceSettings,
    min_interval: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            stub: StubPlugin::new(),
            settings: ServiceSettings::default(),
            min_interval: Duration::ZERO,
        }
    }

    /// Use a pre-scripted stub instead of an empty one.
    pub fn with_stub(mut self, stub: StubPlugin) -> Self {
        self.stub = stub;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.settings.request_timeout = timeout;
        self
    }

    pub fn with_search_limits(mut self, default: usize, max: usize) -> Self {
        self.settings.default_search_limit = default;
        self.settings.max_search_limit = max;
        self
    }

    /// Pace calls to the stub like a rate-limited source.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Build the harness, creating the temp database and restoring plugin state.
    pub async fn build(self) -> Result<TestHarness, ShelfError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ShelfError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        let catalog = Arc::new(SqliteCatalog::open(&storage_config).await?);

        let stub = Arc::new(self.stub);
        let pacing = Arc::new(PacingTable::new());
        pacing.configure(stub.id(), self.min_interval);

        let mut registry = PluginRegistry::new();
        registry.register(stub.clone())?;

        let service = ImportService::new(
            Arc::new(registry),
            catalog.clone(),
            catalog.clone(),
            pacing,
            self.settings,
        );
        service.restore_state().await?;

        Ok(TestHarness {
            service: Arc::new(service),
            catalog,
            stub,
            storage_config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete import stack over a throwaway database.
pub struct TestHarness {
    pub service: Arc<ImportService>,
    pub catalog: Arc<SqliteCatalog>,
    pub stub: Arc<StubPlugin>,
    storage_config: StorageConfig,
    // Dropped last; removes the database directory.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with an unscripted stub and default settings.
    pub async fn new() -> Result<Self, ShelfError> {
        Self::builder().build().await
    }

    /// A second service over the same database, as after a process restart.
    pub async fn restart(&self) -> Result<ImportService, ShelfError> {
        let catalog = Arc::new(SqliteCatalog::open(&self.storage_config).await?);
        let mut registry = PluginRegistry::new();
        registry.register(self.stub.clone())?;
        let service = ImportService::new(
            Arc::new(registry),
            catalog.clone(),
            catalog,
            Arc::new(PacingTable::new()),
            *self.service.settings(),
        );
        service.restore_state().await?;
        Ok(service)
    }
}
