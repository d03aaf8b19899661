// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asset creation and lookup.

use std::collections::BTreeMap;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use shelf_core::{Asset, AssetDraft, Provenance, ShelfError, TypedValue};

use crate::database::{Database, map_tr_err, now_timestamp};
use crate::queries::attributes::{find_by_key, parse_data_type};

/// Insert an asset and all of its attribute values in one transaction.
///
/// Every value key must name an existing attribute of the same data type;
/// otherwise nothing is written.
pub async fn create_asset(db: &Database, draft: &AssetDraft) -> Result<Asset, ShelfError> {
    let draft = draft.clone();
    let created_at = now_timestamp();
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Result<Asset, String>, rusqlite::Error> {
            let tx = conn.transaction()?;

            let (plugin_id, external_id) = match &draft.provenance {
                Some(p) => (Some(p.plugin_id.as_str()), Some(p.external_id.as_str())),
                None => (None, None),
            };
            tx.execute(
                "INSERT INTO assets (name, description, image_url, category_id, quantity,
                                     import_plugin_id, import_external_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    draft.name,
                    draft.description,
                    draft.image_url,
                    draft.category_id,
                    draft.quantity,
                    plugin_id,
                    external_id,
                    created_at,
                ],
            )?;
            let asset_id = tx.last_insert_rowid();

            for (key, value) in &draft.attributes {
                let Some(attribute) = find_by_key(&tx, key)? else {
                    return Ok(Err(format!("attribute `{key}` does not exist")));
                };
                if attribute.data_type != value.data_type() {
                    return Ok(Err(format!(
                        "attribute `{key}` is {} but value is {}",
                        attribute.data_type,
                        value.data_type()
                    )));
                }
                tx.execute(
                    "INSERT INTO asset_attribute_values (asset_id, attribute_id, value) VALUES (?1, ?2, ?3)",
                    params![asset_id, attribute.id, value.to_storage()],
                )?;
            }
            tx.commit()?;

            Ok(Ok(Asset {
                id: asset_id,
                name: draft.name,
                description: draft.description,
                image_url: draft.image_url,
                category_id: draft.category_id,
                quantity: draft.quantity,
                attributes: draft.attributes,
                provenance: draft.provenance,
                created_at,
            }))
        })
        .await
        .map_err(map_tr_err)?;

    outcome.map_err(ShelfError::Internal)
}

fn load_values(conn: &Connection, asset_id: i64) -> rusqlite::Result<BTreeMap<String, TypedValue>> {
    let mut stmt = conn.prepare(
        "SELECT a.key, a.data_type, v.value
         FROM asset_attribute_values v
         JOIN attributes a ON a.id = v.attribute_id
         WHERE v.asset_id = ?1",
    )?;
    let rows = stmt.query_map(params![asset_id], |row| {
        let key: String = row.get(0)?;
        let data_type: String = row.get(1)?;
        let raw: String = row.get(2)?;
        let data_type = parse_data_type(1, &data_type)?;
        let value = TypedValue::from_storage(data_type, &raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
        Ok((key, value))
    })?;
    let mut values = BTreeMap::new();
    for row in rows {
        let (key, value) = row?;
        values.insert(key, value);
    }
    Ok(values)
}

pub async fn get_asset(db: &Database, id: i64) -> Result<Option<Asset>, ShelfError> {
    db.connection()
        .call(move |conn| {
            let asset = conn
                .query_row(
                    "SELECT id, name, description, image_url, category_id, quantity,
                            import_plugin_id, import_external_id, created_at
                     FROM assets WHERE id = ?1",
                    params![id],
                    |row| {
                        let plugin_id: Option<String> = row.get(6)?;
                        let external_id: Option<String> = row.get(7)?;
                        Ok(Asset {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            description: row.get(2)?,
                            image_url: row.get(3)?,
                            category_id: row.get(4)?,
                            quantity: row.get(5)?,
                            attributes: BTreeMap::new(),
                            provenance: plugin_id.zip(external_id).map(|(plugin_id, external_id)| {
                                Provenance {
                                    plugin_id,
                                    external_id,
                                }
                            }),
                            created_at: row.get(8)?,
                        })
                    },
                )
                .optional()?;
            match asset {
                Some(mut asset) => {
                    asset.attributes = load_values(conn, asset.id)?;
                    Ok(Some(asset))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Number of assets filed under `category_id`.
pub async fn count_assets_in_category(db: &Database, category_id: i64) -> Result<i64, ShelfError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM assets WHERE category_id = ?1",
                params![category_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Ids of assets imported from `plugin_id` with `external_id`, oldest first.
pub async fn find_by_provenance(
    db: &Database,
    plugin_id: &str,
    external_id: &str,
) -> Result<Vec<i64>, ShelfError> {
    let plugin_id = plugin_id.to_string();
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM assets WHERE import_plugin_id = ?1 AND import_external_id = ?2 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![plugin_id, external_id], |row| row.get(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            Ok(ids)
        })
        .await
        .map_err(map_tr_err)
}
