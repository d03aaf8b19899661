// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Shelf import plugin system.
//!
//! This crate provides the error taxonomy, the schema and data types, the
//! loose-value coercion rules, and the trait seams that adapters and
//! persistence backends implement.

pub mod error;
pub mod traits;
pub mod types;
pub mod value;

// Re-export key items at crate root for ergonomic imports.
pub use error::ShelfError;
pub use traits::{
    AssetRepository, DeprovisionOutcome, ImportPlugin, PluginSchema, ProvisionReport,
    SchemaRepository, StoredPluginState,
};
pub use types::{
    Asset, AssetDraft, Attribute, Category, CategoryAttribute, DataType, ImportData,
    PluginAttribute, PluginStatus, PluginSummary, Provenance, SearchField, SearchResult,
};
pub use value::{AttributeValue, CoercionError, TypedValue, coerce};
