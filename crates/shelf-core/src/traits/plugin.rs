// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The capability contract every external-source adapter implements.

use async_trait::async_trait;

use crate::error::ShelfError;
use crate::types::{ImportData, PluginAttribute, SearchField, SearchResult, category_slug};

/// An adapter for one external data source.
///
/// `attributes()` and `search_fields()` must return the same data for the
/// whole process lifetime. `search` returns an empty vector for zero matches
/// and errors only on upstream or transport failure. `fetch` returns the same
/// mapping for the same id as long as the upstream record is unchanged.
#[async_trait]
pub trait ImportPlugin: Send + Sync + 'static {
    /// Stable plugin identifier (e.g. `googlebooks`).
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Name of the category this plugin owns.
    fn category_name(&self) -> &str;

    fn category_description(&self) -> &str;

    /// Namespace prefix for this plugin's attribute keys.
    fn category_slug(&self) -> String {
        category_slug(self.category_name())
    }

    /// Attributes declared at compile time.
    fn attributes(&self) -> &[PluginAttribute];

    fn search_fields(&self) -> &[SearchField];

    /// Search the upstream source by `field`.
    async fn search(
        &self,
        field: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, ShelfError>;

    /// Fetch and normalize a single upstream record.
    async fn fetch(&self, external_id: &str) -> Result<ImportData, ShelfError>;

    /// Look up a declared attribute by key.
    fn attribute(&self, key: &str) -> Option<&PluginAttribute> {
        self.attributes().iter().find(|a| a.key == key)
    }

    fn has_search_field(&self, key: &str) -> bool {
        self.search_fields().iter().any(|f| f.key == key)
    }
}
