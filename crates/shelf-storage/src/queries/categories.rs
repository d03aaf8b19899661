// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category reads and user-category creation.

use rusqlite::{Connection, OptionalExtension, Row, params};
use shelf_core::{Category, ShelfError};

use crate::database::{Database, map_tr_err};

pub(crate) const CATEGORY_COLUMNS: &str = "id, name, description, plugin_id";

pub(crate) fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        plugin_id: row.get(3)?,
    })
}

/// Synchronous lookup, usable inside a transaction.
pub(crate) fn find_by_plugin(
    conn: &Connection,
    plugin_id: &str,
) -> rusqlite::Result<Option<Category>> {
    conn.query_row(
        &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE plugin_id = ?1"),
        params![plugin_id],
        category_from_row,
    )
    .optional()
}

/// The category owned by `plugin_id`, if provisioned.
pub async fn category_for_plugin(
    db: &Database,
    plugin_id: &str,
) -> Result<Option<Category>, ShelfError> {
    let plugin_id = plugin_id.to_string();
    db.connection()
        .call(move |conn| find_by_plugin(conn, &plugin_id))
        .await
        .map_err(map_tr_err)
}

/// Number of category rows owned by `plugin_id` (0 or 1 by construction).
pub async fn count_categories_for_plugin(
    db: &Database,
    plugin_id: &str,
) -> Result<i64, ShelfError> {
    let plugin_id = plugin_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM categories WHERE plugin_id = ?1",
                params![plugin_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_category(db: &Database, id: i64) -> Result<Option<Category>, ShelfError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
                params![id],
                category_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Create a category not owned by any plugin.
pub async fn create_user_category(
    db: &Database,
    name: &str,
    description: Option<&str>,
) -> Result<Category, ShelfError> {
    let name = name.to_string();
    let description = description.map(str::to_string);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO categories (name, description, plugin_id) VALUES (?1, ?2, NULL)",
                params![name, description],
            )?;
            Ok(Category {
                id: conn.last_insert_rowid(),
                name,
                description,
                plugin_id: None,
            })
        })
        .await
        .map_err(map_tr_err)
}
