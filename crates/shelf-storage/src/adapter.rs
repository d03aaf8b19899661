// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the schema and asset repositories.

use async_trait::async_trait;
use tracing::info;

use shelf_config::model::StorageConfig;
use shelf_core::{
    Asset, AssetDraft, AssetRepository, Attribute, Category, CategoryAttribute, DataType,
    DeprovisionOutcome, PluginSchema, ProvisionReport, SchemaRepository, ShelfError,
    StoredPluginState,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed catalog of categories, attributes, assets, and plugin state.
///
/// Cloning shares the underlying connection.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    db: Database,
}

impl SqliteCatalog {
    /// Open the database named by the storage configuration.
    pub async fn open(config: &StorageConfig) -> Result<Self, ShelfError> {
        let db = Database::open_with(&config.database_path, config.wal_mode).await?;
        info!(path = %config.database_path, "catalog database ready");
        Ok(Self { db })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn close(&self) -> Result<(), ShelfError> {
        self.db.close().await
    }

    pub async fn get_category(&self, id: i64) -> Result<Option<Category>, ShelfError> {
        queries::categories::get_category(&self.db, id).await
    }

    /// Number of categories owned by `plugin_id`; at most one by construction.
    pub async fn count_categories_for_plugin(&self, plugin_id: &str) -> Result<i64, ShelfError> {
        queries::categories::count_categories_for_plugin(&self.db, plugin_id).await
    }

    pub async fn create_user_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, ShelfError> {
        queries::categories::create_user_category(&self.db, name, description).await
    }

    pub async fn attribute_by_key(&self, key: &str) -> Result<Option<Attribute>, ShelfError> {
        queries::attributes::attribute_by_key(&self.db, key).await
    }

    pub async fn list_category_attributes(
        &self,
        category_id: i64,
    ) -> Result<Vec<CategoryAttribute>, ShelfError> {
        queries::attributes::list_category_attributes(&self.db, category_id).await
    }

    pub async fn list_plugin_attributes(
        &self,
        plugin_id: &str,
    ) -> Result<Vec<Attribute>, ShelfError> {
        queries::attributes::list_plugin_attributes(&self.db, plugin_id).await
    }

    pub async fn create_user_attribute(
        &self,
        key: &str,
        name: &str,
        data_type: DataType,
    ) -> Result<Attribute, ShelfError> {
        queries::attributes::create_user_attribute(&self.db, key, name, data_type).await
    }

    pub async fn link_attribute(
        &self,
        category_id: i64,
        attribute_id: i64,
        required: bool,
    ) -> Result<(), ShelfError> {
        queries::attributes::link_attribute(&self.db, category_id, attribute_id, required).await
    }

    pub async fn get_asset(&self, id: i64) -> Result<Option<Asset>, ShelfError> {
        queries::assets::get_asset(&self.db, id).await
    }

    pub async fn count_assets_in_category(&self, category_id: i64) -> Result<i64, ShelfError> {
        queries::assets::count_assets_in_category(&self.db, category_id).await
    }

    pub async fn find_by_provenance(
        &self,
        plugin_id: &str,
        external_id: &str,
    ) -> Result<Vec<i64>, ShelfError> {
        queries::assets::find_by_provenance(&self.db, plugin_id, external_id).await
    }
}

#[async_trait]
impl SchemaRepository for SqliteCatalog {
    async fn provision(&self, schema: &PluginSchema) -> Result<ProvisionReport, ShelfError> {
        queries::provisioning::provision(&self.db, schema).await
    }

    async fn deprovision(&self, plugin_id: &str) -> Result<DeprovisionOutcome, ShelfError> {
        queries::provisioning::deprovision(&self.db, plugin_id).await
    }

    async fn category_for_plugin(&self, plugin_id: &str) -> Result<Option<Category>, ShelfError> {
        queries::categories::category_for_plugin(&self.db, plugin_id).await
    }

    async fn save_plugin_state(&self, plugin_id: &str, enabled: bool) -> Result<(), ShelfError> {
        queries::plugin_state::save_plugin_state(&self.db, plugin_id, enabled).await
    }

    async fn load_plugin_states(&self) -> Result<Vec<StoredPluginState>, ShelfError> {
        queries::plugin_state::load_plugin_states(&self.db).await
    }
}

#[async_trait]
impl AssetRepository for SqliteCatalog {
    async fn create_asset(&self, draft: &AssetDraft) -> Result<Asset, ShelfError> {
        queries::assets::create_asset(&self.db, draft).await
    }
}
