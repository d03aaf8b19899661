// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./shelf.toml` > `~/.config/shelf/shelf.toml` > `/etc/shelf/shelf.toml`
//! with environment variable overrides via the `SHELF_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ShelfConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/shelf/shelf.toml`
/// 3. `~/.config/shelf/shelf.toml`
/// 4. `./shelf.toml`
/// 5. `SHELF_*` environment variables
pub fn load_config() -> Result<ShelfConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShelfConfig::default()))
        .merge(Toml::file("/etc/shelf/shelf.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("shelf/shelf.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("shelf.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ShelfConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShelfConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ShelfConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShelfConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Maps `SHELF_*` variables onto config paths.
///
/// Uses explicit prefixes rather than `Env::split("_")` because key names
/// contain underscores: `SHELF_TMDB_API_TOKEN` must become
/// `plugins.tmdb.api_token`, not `tmdb.api.token`.
fn env_provider() -> Env {
    Env::prefixed("SHELF_").map(|key| {
        let key_str = key.as_str();
        let mapped = if let Some(rest) = key_str.strip_prefix("googlebooks_") {
            format!("plugins.googlebooks.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("tmdb_") {
            format!("plugins.tmdb.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("bgg_") {
            format!("plugins.bgg.{rest}")
        } else {
            key_str
                .replacen("service_", "service.", 1)
                .replacen("storage_", "storage.", 1)
        };
        mapped.into()
    })
}
