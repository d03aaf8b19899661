// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted enabled/disabled flags.

use rusqlite::params;
use shelf_core::{ShelfError, StoredPluginState};

use crate::database::{Database, map_tr_err, now_timestamp};

pub async fn save_plugin_state(
    db: &Database,
    plugin_id: &str,
    enabled: bool,
) -> Result<(), ShelfError> {
    let plugin_id = plugin_id.to_string();
    let updated_at = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO plugin_state (plugin_id, enabled, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(plugin_id) DO UPDATE SET enabled = excluded.enabled, updated_at = excluded.updated_at",
                params![plugin_id, enabled, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Every persisted flag, joined with the plugin's category id when one exists.
pub async fn load_plugin_states(db: &Database) -> Result<Vec<StoredPluginState>, ShelfError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.plugin_id, s.enabled, c.id
                 FROM plugin_state s
                 LEFT JOIN categories c ON c.plugin_id = s.plugin_id
                 ORDER BY s.plugin_id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(StoredPluginState {
                    plugin_id: row.get(0)?,
                    enabled: row.get(1)?,
                    category_id: row.get(2)?,
                })
            })?;
            let mut states = Vec::new();
            for row in rows {
                states.push(row?);
            }
            Ok(states)
        })
        .await
        .map_err(map_tr_err)
}
