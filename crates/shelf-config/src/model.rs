// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Shelf configuration. All sections default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShelfConfig {
    /// Request handling and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Per-plugin source settings.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// Request handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upper bound for a single outbound adapter call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Limit used when a search request asks for zero results.
    #[serde(default = "default_search_limit")]
    pub default_search_limit: usize,

    /// Search limits above this are clamped.
    #[serde(default = "default_max_search_limit")]
    pub max_search_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout_secs(),
            default_search_limit: default_search_limit(),
            max_search_limit: default_max_search_limit(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_search_limit() -> usize {
    10
}

fn default_max_search_limit() -> usize {
    40
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("shelf").join("shelf.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("shelf.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Settings for every compiled-in plugin.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    #[serde(default)]
    pub googlebooks: GoogleBooksConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub bgg: BggConfig,
}

/// Google Books volumes API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleBooksConfig {
    /// Register the plugin at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_googlebooks_base_url")]
    pub base_url: String,

    /// Optional API key, sent as the `key` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Minimum milliseconds between calls. Zero disables pacing.
    #[serde(default)]
    pub min_interval_ms: u64,
}

impl Default for GoogleBooksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_googlebooks_base_url(),
            api_key: None,
            min_interval_ms: 0,
        }
    }
}

fn default_googlebooks_base_url() -> String {
    "https://www.googleapis.com/books/v1".to_string()
}

/// The Movie Database v3 API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TmdbConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,

    /// Base for poster URLs; a size segment and the poster path are appended.
    #[serde(default = "default_tmdb_image_base_url")]
    pub image_base_url: String,

    /// v4 read access token, sent as a bearer token.
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_tmdb_language")]
    pub language: String,

    #[serde(default)]
    pub min_interval_ms: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_tmdb_base_url(),
            image_base_url: default_tmdb_image_base_url(),
            api_token: None,
            language: default_tmdb_language(),
            min_interval_ms: 0,
        }
    }
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

/// BoardGameGeek XML API2.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BggConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_bgg_base_url")]
    pub base_url: String,

    /// Optional application token, sent as a bearer token.
    #[serde(default)]
    pub api_token: Option<String>,

    /// BGG asks clients to leave several seconds between requests.
    #[serde(default = "default_bgg_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for BggConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_bgg_base_url(),
            api_token: None,
            min_interval_ms: default_bgg_min_interval_ms(),
        }
    }
}

fn default_bgg_base_url() -> String {
    "https://boardgamegeek.com/xmlapi2".to_string()
}

fn default_bgg_min_interval_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}
