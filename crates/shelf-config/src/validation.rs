// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ShelfConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Hard ceiling for `service.max_search_limit`.
pub const SEARCH_LIMIT_CEILING: usize = 100;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &ShelfConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let service = &config.service;

    if !LOG_LEVELS.contains(&service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` must be one of: {}",
                service.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if !(1..=120).contains(&service.request_timeout_secs) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.request_timeout_secs must be between 1 and 120, got {}",
                service.request_timeout_secs
            ),
        });
    }

    if service.max_search_limit > SEARCH_LIMIT_CEILING {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.max_search_limit must be at most {SEARCH_LIMIT_CEILING}, got {}",
                service.max_search_limit
            ),
        });
    }

    if service.default_search_limit == 0 || service.default_search_limit > service.max_search_limit
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.default_search_limit must be between 1 and max_search_limit ({}), got {}",
                service.max_search_limit, service.default_search_limit
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let plugins = &config.plugins;
    let urls = [
        ("plugins.googlebooks.base_url", &plugins.googlebooks.base_url),
        ("plugins.tmdb.base_url", &plugins.tmdb.base_url),
        ("plugins.tmdb.image_base_url", &plugins.tmdb.image_base_url),
        ("plugins.bgg.base_url", &plugins.bgg.base_url),
    ];
    for (key, url) in urls {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            errors.push(ConfigError::Validation {
                message: format!("{key} `{url}` must be an http(s) URL"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
