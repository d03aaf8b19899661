// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema and data types shared by adapters, storage, and the orchestrator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::value::{AttributeValue, TypedValue};

/// The closed set of attribute data types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Text,
    Number,
    Boolean,
    Date,
}

/// Derive a category slug from a display name: lowercase ASCII alphanumerics only.
///
/// `"Board Games"` becomes `"boardgames"`.
pub fn category_slug(category_name: &str) -> String {
    category_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Build a namespaced attribute key `"<slug>.<name>"`.
pub fn namespaced_key(slug: &str, name: &str) -> String {
    format!("{slug}.{name}")
}

/// An attribute declared by a plugin at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginAttribute {
    /// Namespaced key, e.g. `books.isbn`.
    pub key: String,
    /// Human-readable name.
    pub name: String,
    pub data_type: DataType,
    /// Whether the category link is marked required.
    pub required: bool,
    /// Owning plugin id.
    pub plugin_id: String,
}

impl PluginAttribute {
    /// Declare an optional attribute under `slug`.
    pub fn namespaced(
        plugin_id: &str,
        slug: &str,
        name: &str,
        display_name: &str,
        data_type: DataType,
    ) -> Self {
        Self {
            key: namespaced_key(slug, name),
            name: display_name.to_string(),
            data_type,
            required: false,
            plugin_id: plugin_id.to_string(),
        }
    }

    /// Mark the attribute as required on the plugin's category.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A field an adapter can search by (e.g. `title`, `isbn`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchField {
    pub key: String,
    pub label: String,
}

impl SearchField {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// One hit returned by an adapter search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub external_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A fully fetched external record, normalized but not yet coerced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportData {
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Attribute key to loosely-typed value.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl ImportData {
    /// Insert an attribute value if present.
    pub fn set(&mut self, key: impl Into<String>, value: Option<impl Into<AttributeValue>>) {
        if let Some(value) = value {
            self.attributes.insert(key.into(), value.into());
        }
    }
}

/// Persisted category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// `None` for user-created categories.
    pub plugin_id: Option<String>,
}

/// Persisted attribute row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub data_type: DataType,
    /// `None` for user-defined attributes.
    pub plugin_id: Option<String>,
}

/// A category-to-attribute link, joined with the attribute key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAttribute {
    pub category_id: i64,
    pub attribute_id: i64,
    pub attribute_key: String,
    pub required: bool,
    pub sort_order: i64,
}

/// Import origin of an asset. Both halves are always present together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(rename = "import_plugin_id")]
    pub plugin_id: String,
    #[serde(rename = "import_external_id")]
    pub external_id: String,
}

/// An asset about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDraft {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub quantity: i64,
    pub attributes: BTreeMap<String, TypedValue>,
    pub provenance: Option<Provenance>,
}

/// A stored asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub quantity: i64,
    pub attributes: BTreeMap<String, TypedValue>,
    #[serde(flatten)]
    pub provenance: Option<Provenance>,
    pub created_at: String,
}

impl Asset {
    pub fn import_plugin_id(&self) -> Option<&str> {
        self.provenance.as_ref().map(|p| p.plugin_id.as_str())
    }

    pub fn import_external_id(&self) -> Option<&str> {
        self.provenance.as_ref().map(|p| p.external_id.as_str())
    }
}

/// Lifecycle state of a plugin's provisioned schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    /// Never enabled; searchable, provisioned on first import.
    Unprovisioned,
    /// Schema provisioned and the plugin accepts requests.
    Enabled,
    /// Explicitly disabled; rejects search and import.
    Disabled,
}

/// Read-only view of a plugin returned by `ListPlugins`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category_name: String,
    pub search_fields: Vec<SearchField>,
    pub enabled: bool,
    pub status: PluginStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}
