// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomic provisioning and removal of a plugin's category and attributes.
//!
//! Both operations run as one `BEGIN IMMEDIATE` transaction, so readers
//! never observe a half-provisioned category. Provisioning only ever adds:
//! existing links keep their order and flags, and user-added links on a
//! plugin category are left alone.

use rusqlite::{ErrorCode, TransactionBehavior, params};
use shelf_core::{Category, DeprovisionOutcome, PluginSchema, ProvisionReport, ShelfError};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::queries::attributes::{append_link, find_by_key, is_linked};
use crate::queries::categories::find_by_plugin;

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}

/// Insert the plugin's category, or reuse the row another writer created first.
fn ensure_category(
    conn: &rusqlite::Connection,
    schema: &PluginSchema,
) -> rusqlite::Result<(Category, bool)> {
    if let Some(existing) = find_by_plugin(conn, &schema.plugin_id)? {
        return Ok((existing, false));
    }
    let inserted = conn.execute(
        "INSERT INTO categories (name, description, plugin_id) VALUES (?1, ?2, ?3)",
        params![
            schema.category_name,
            schema.category_description,
            schema.plugin_id
        ],
    );
    match inserted {
        Ok(_) => Ok((
            Category {
                id: conn.last_insert_rowid(),
                name: schema.category_name.clone(),
                description: Some(schema.category_description.clone()),
                plugin_id: Some(schema.plugin_id.clone()),
            },
            true,
        )),
        Err(e) if is_unique_violation(&e) => {
            debug!(plugin_id = %schema.plugin_id, "category created concurrently; reusing");
            match find_by_plugin(conn, &schema.plugin_id)? {
                Some(existing) => Ok((existing, false)),
                None => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}

/// Create or reconcile the plugin's category, attributes, and links.
///
/// Fails with [`ShelfError::Conflict`], writing nothing, when a declared key
/// already exists with another data type or belongs to someone else.
pub async fn provision(
    db: &Database,
    schema: &PluginSchema,
) -> Result<ProvisionReport, ShelfError> {
    let schema = schema.clone();
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Result<ProvisionReport, String>, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let (category, category_created) = ensure_category(&tx, &schema)?;

            let mut attributes_created = Vec::new();
            let mut links_added = Vec::new();

            for declared in &schema.attributes {
                let attribute_id = match find_by_key(&tx, &declared.key)? {
                    None => {
                        tx.execute(
                            "INSERT INTO attributes (key, name, data_type, plugin_id) VALUES (?1, ?2, ?3, ?4)",
                            params![
                                declared.key,
                                declared.name,
                                declared.data_type.to_string(),
                                schema.plugin_id
                            ],
                        )?;
                        attributes_created.push(declared.key.clone());
                        tx.last_insert_rowid()
                    }
                    Some(existing) => {
                        if existing.data_type != declared.data_type {
                            return Ok(Err(format!(
                                "attribute `{}` exists as {} but plugin `{}` declares {}",
                                declared.key,
                                existing.data_type,
                                schema.plugin_id,
                                declared.data_type
                            )));
                        }
                        match existing.plugin_id.as_deref() {
                            Some(owner) if owner == schema.plugin_id => {}
                            Some(owner) => {
                                return Ok(Err(format!(
                                    "attribute `{}` is owned by plugin `{owner}`",
                                    declared.key
                                )));
                            }
                            None => {
                                return Ok(Err(format!(
                                    "attribute `{}` is a user-defined attribute",
                                    declared.key
                                )));
                            }
                        }
                        existing.id
                    }
                };

                if !is_linked(&tx, category.id, attribute_id)? {
                    append_link(&tx, category.id, attribute_id, declared.required)?;
                    links_added.push(declared.key.clone());
                }
            }

            tx.commit()?;
            Ok(Ok(ProvisionReport {
                category_id: category.id,
                category_created,
                attributes_created,
                links_added,
            }))
        })
        .await
        .map_err(map_tr_err)?;

    outcome.map_err(ShelfError::Conflict)
}

/// Remove the plugin's category unless assets still reference it.
///
/// On removal, plugin-owned attributes that are no longer linked anywhere
/// and hold no values are deleted too.
pub async fn deprovision(db: &Database, plugin_id: &str) -> Result<DeprovisionOutcome, ShelfError> {
    let plugin_id = plugin_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(category) = find_by_plugin(&tx, &plugin_id)? else {
                return Ok(DeprovisionOutcome::NotProvisioned);
            };

            let asset_count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM assets WHERE category_id = ?1",
                params![category.id],
                |row| row.get(0),
            )?;
            if asset_count > 0 {
                return Ok(DeprovisionOutcome::Retained {
                    category_id: category.id,
                    asset_count,
                });
            }

            let owned: Vec<(i64, String)> = {
                let mut stmt =
                    tx.prepare("SELECT id, key FROM attributes WHERE plugin_id = ?1 ORDER BY key")?;
                let rows =
                    stmt.query_map(params![plugin_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
                let mut owned = Vec::new();
                for row in rows {
                    owned.push(row?);
                }
                owned
            };

            tx.execute(
                "DELETE FROM category_attributes WHERE category_id = ?1",
                params![category.id],
            )?;
            tx.execute("DELETE FROM categories WHERE id = ?1", params![category.id])?;

            let mut attributes_removed = Vec::new();
            for (attribute_id, key) in owned {
                let in_use: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM category_attributes WHERE attribute_id = ?1)
                         OR EXISTS(SELECT 1 FROM asset_attribute_values WHERE attribute_id = ?1)",
                    params![attribute_id],
                    |row| row.get(0),
                )?;
                if !in_use {
                    tx.execute("DELETE FROM attributes WHERE id = ?1", params![attribute_id])?;
                    attributes_removed.push(key);
                }
            }

            tx.commit()?;
            Ok(DeprovisionOutcome::Removed {
                category_id: category.id,
                attributes_removed,
            })
        })
        .await
        .map_err(map_tr_err)
}
