// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps upstream status codes and transport failures onto [`ShelfError`].

use std::time::Duration;

use reqwest::StatusCode;
use shelf_core::ShelfError;

/// Classify a non-success response.
///
/// Returns `None` for statuses the caller should treat as success. `202
/// Accepted` on a GET means the upstream queued the work and has no body
/// yet, so it is reported as unavailable.
pub fn classify_status(
    plugin_id: &str,
    external_id: Option<&str>,
    status: StatusCode,
) -> Option<ShelfError> {
    if status.is_success() && status != StatusCode::ACCEPTED {
        return None;
    }
    let err = match status {
        StatusCode::NOT_FOUND => match external_id {
            Some(id) => ShelfError::NotFound {
                plugin_id: plugin_id.to_string(),
                external_id: id.to_string(),
            },
            None => ShelfError::unavailable(plugin_id, "upstream endpoint not found (HTTP 404)"),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ShelfError::Unauthorized {
            plugin_id: plugin_id.to_string(),
            message: format!("HTTP {}", status.as_u16()),
        },
        StatusCode::ACCEPTED => {
            ShelfError::unavailable(plugin_id, "request queued upstream (HTTP 202)")
        }
        StatusCode::TOO_MANY_REQUESTS => {
            ShelfError::unavailable(plugin_id, "rate limited upstream (HTTP 429)")
        }
        s => ShelfError::unavailable(plugin_id, format!("upstream returned HTTP {}", s.as_u16())),
    };
    Some(err)
}

/// Classify a transport-level failure (connect, timeout, body read).
pub fn classify_transport(plugin_id: &str, timeout: Duration, err: reqwest::Error) -> ShelfError {
    let message = if err.is_timeout() {
        format!("request timed out after {timeout:?}")
    } else if err.is_connect() {
        "could not connect to upstream".to_string()
    } else {
        "request failed".to_string()
    };
    ShelfError::Unavailable {
        plugin_id: plugin_id.to_string(),
        message,
        source: Some(Box::new(err.without_url())),
    }
}
