// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attribute and category-attribute link operations.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use shelf_core::{Attribute, CategoryAttribute, DataType, ShelfError};

use crate::database::{Database, map_tr_err};

pub(crate) fn parse_data_type(idx: usize, raw: &str) -> rusqlite::Result<DataType> {
    DataType::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn attribute_from_row(row: &Row<'_>) -> rusqlite::Result<Attribute> {
    let data_type: String = row.get(3)?;
    Ok(Attribute {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        data_type: parse_data_type(3, &data_type)?,
        plugin_id: row.get(4)?,
    })
}

/// Synchronous lookup, usable inside a transaction.
pub(crate) fn find_by_key(conn: &Connection, key: &str) -> rusqlite::Result<Option<Attribute>> {
    conn.query_row(
        "SELECT id, key, name, data_type, plugin_id FROM attributes WHERE key = ?1",
        params![key],
        attribute_from_row,
    )
    .optional()
}

/// Whether `attribute_id` is linked to `category_id`.
pub(crate) fn is_linked(
    conn: &Connection,
    category_id: i64,
    attribute_id: i64,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM category_attributes WHERE category_id = ?1 AND attribute_id = ?2)",
        params![category_id, attribute_id],
        |row| row.get(0),
    )
}

/// Append a link after the category's current last link.
pub(crate) fn append_link(
    conn: &Connection,
    category_id: i64,
    attribute_id: i64,
    required: bool,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO category_attributes (category_id, attribute_id, required, sort_order)
         VALUES (?1, ?2, ?3,
                 (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM category_attributes WHERE category_id = ?1))",
        params![category_id, attribute_id, required],
    )?;
    Ok(())
}

pub async fn attribute_by_key(db: &Database, key: &str) -> Result<Option<Attribute>, ShelfError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| find_by_key(conn, &key))
        .await
        .map_err(map_tr_err)
}

/// Links of a category in display order.
pub async fn list_category_attributes(
    db: &Database,
    category_id: i64,
) -> Result<Vec<CategoryAttribute>, ShelfError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT ca.category_id, ca.attribute_id, a.key, ca.required, ca.sort_order
                 FROM category_attributes ca
                 JOIN attributes a ON a.id = ca.attribute_id
                 WHERE ca.category_id = ?1
                 ORDER BY ca.sort_order ASC, ca.attribute_id ASC",
            )?;
            let rows = stmt.query_map(params![category_id], |row| {
                Ok(CategoryAttribute {
                    category_id: row.get(0)?,
                    attribute_id: row.get(1)?,
                    attribute_key: row.get(2)?,
                    required: row.get(3)?,
                    sort_order: row.get(4)?,
                })
            })?;
            let mut links = Vec::new();
            for row in rows {
                links.push(row?);
            }
            Ok(links)
        })
        .await
        .map_err(map_tr_err)
}

/// Attributes owned by `plugin_id`, by key.
pub async fn list_plugin_attributes(
    db: &Database,
    plugin_id: &str,
) -> Result<Vec<Attribute>, ShelfError> {
    let plugin_id = plugin_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, key, name, data_type, plugin_id FROM attributes
                 WHERE plugin_id = ?1 ORDER BY key ASC",
            )?;
            let rows = stmt.query_map(params![plugin_id], attribute_from_row)?;
            let mut attributes = Vec::new();
            for row in rows {
                attributes.push(row?);
            }
            Ok(attributes)
        })
        .await
        .map_err(map_tr_err)
}

/// Create an attribute not owned by any plugin.
pub async fn create_user_attribute(
    db: &Database,
    key: &str,
    name: &str,
    data_type: DataType,
) -> Result<Attribute, ShelfError> {
    let key = key.to_string();
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO attributes (key, name, data_type, plugin_id) VALUES (?1, ?2, ?3, NULL)",
                params![key, name, data_type.to_string()],
            )?;
            Ok(Attribute {
                id: conn.last_insert_rowid(),
                key,
                name,
                data_type,
                plugin_id: None,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Link an attribute to a category at the end of its sort order. No-op if already linked.
pub async fn link_attribute(
    db: &Database,
    category_id: i64,
    attribute_id: i64,
    required: bool,
) -> Result<(), ShelfError> {
    db.connection()
        .call(move |conn| {
            if !is_linked(conn, category_id, attribute_id)? {
                append_link(conn, category_id, attribute_id, required)?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
