// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Shelf import plugin system.
//!
//! Adapters and the external client classify every transport or parsing
//! failure into one of these variants before it leaves the adapter, so the
//! orchestrator and the API layer only ever match on this enum.

use thiserror::Error;

/// Message surfaced to callers for upstream faults.
pub const SERVICE_UNAVAILABLE: &str = "service unavailable";

/// The primary error type used across all Shelf crates.
#[derive(Debug, Error)]
pub enum ShelfError {
    /// Caller supplied bad input (unknown search field, empty query, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The plugin id is not registered.
    #[error("plugin not found: {plugin_id}")]
    PluginNotFound { plugin_id: String },

    /// The upstream source reports that the identifier does not exist.
    #[error("{plugin_id}: external record not found: {external_id}")]
    NotFound {
        plugin_id: String,
        external_id: String,
    },

    /// The plugin exists but has been disabled by an administrator.
    #[error("plugin is disabled: {plugin_id}")]
    DisabledPlugin { plugin_id: String },

    /// Provisioning found persisted schema incompatible with the plugin's declaration.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The upstream source rejected or was never given a credential.
    #[error("{plugin_id}: upstream rejected credentials: {message}")]
    Unauthorized { plugin_id: String, message: String },

    /// Timeout, 5xx, 429, network failure, or an unparseable upstream payload.
    #[error("{plugin_id}: upstream unavailable: {message}")]
    Unavailable {
        plugin_id: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, bad header values, missing settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShelfError {
    /// Shorthand for an [`ShelfError::Unavailable`] without an underlying source.
    pub fn unavailable(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        ShelfError::Unavailable {
            plugin_id: plugin_id.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for errors caused by the caller rather than by Shelf or an upstream.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            ShelfError::Validation(_)
                | ShelfError::PluginNotFound { .. }
                | ShelfError::NotFound { .. }
                | ShelfError::DisabledPlugin { .. }
                | ShelfError::Conflict(_)
        )
    }

    /// Returns true for upstream credential or availability failures.
    pub fn is_upstream_fault(&self) -> bool {
        matches!(
            self,
            ShelfError::Unauthorized { .. } | ShelfError::Unavailable { .. }
        )
    }

    /// The message safe to hand back to an API caller.
    ///
    /// Upstream faults collapse into a generic message; their detail is only logged.
    pub fn public_message(&self) -> String {
        if self.is_client_fault() {
            self.to_string()
        } else if self.is_upstream_fault() {
            SERVICE_UNAVAILABLE.to_string()
        } else {
            "internal error".to_string()
        }
    }
}
