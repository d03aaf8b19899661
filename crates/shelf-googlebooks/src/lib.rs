// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Books adapter for Shelf.
//!
//! Implements [`ImportPlugin`] over the public volumes API. Searches map the
//! `title`, `author`, and `isbn` fields onto the API's `intitle:`,
//! `inauthor:`, and `isbn:` query qualifiers. An API key is optional and is
//! sent as the `key` query parameter when configured.

pub mod types;

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use shelf_client::normalize::{decode_entities, join_values, non_blank, secure_url};
use shelf_client::{ClientOptions, ExternalClient, PluginAuth};
use shelf_config::model::GoogleBooksConfig;
use shelf_core::types::category_slug;
use shelf_core::{
    AttributeValue, DataType, ImportData, ImportPlugin, PluginAttribute, SearchField,
    SearchResult, ShelfError,
};
use tracing::debug;

use crate::types::{Volume, VolumeList};

pub const PLUGIN_ID: &str = "googlebooks";
pub const CATEGORY_NAME: &str = "Books";

/// Upper bound the volumes API accepts for `maxResults`.
pub const MAX_RESULTS: usize = 40;

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p>").unwrap());
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Book metadata from Google Books.
pub struct GoogleBooksPlugin {
    client: ExternalClient,
    attributes: Vec<PluginAttribute>,
    search_fields: Vec<SearchField>,
}

impl GoogleBooksPlugin {
    pub fn new(config: &GoogleBooksConfig, timeout: Duration) -> Result<Self, ShelfError> {
        let auth = PluginAuth::query_param("key", config.api_key.as_deref());
        let client = ExternalClient::new(
            PLUGIN_ID,
            ClientOptions::new(config.base_url.as_str())
                .with_auth(auth)
                .with_timeout(timeout),
        )?;
        Ok(Self::with_client(client))
    }

    /// Build the adapter around an existing client.
    pub fn with_client(client: ExternalClient) -> Self {
        let slug = category_slug(CATEGORY_NAME);
        let attr = |name: &str, display: &str, data_type: DataType| {
            PluginAttribute::namespaced(PLUGIN_ID, &slug, name, display, data_type)
        };
        let attributes = vec![
            attr("isbn", "ISBN", DataType::String),
            attr("authors", "Authors", DataType::String),
            attr("publisher", "Publisher", DataType::String),
            attr("published_date", "Published Date", DataType::Date),
            attr("page_count", "Page Count", DataType::Number),
            attr("categories", "Subjects", DataType::String),
            attr("language", "Language", DataType::String),
        ];
        let search_fields = vec![
            SearchField::new("title", "Title"),
            SearchField::new("author", "Author"),
            SearchField::new("isbn", "ISBN"),
        ];
        Self {
            client,
            attributes,
            search_fields,
        }
    }
}

/// Build the `q` parameter for a search field.
fn volume_query(field: &str, query: &str) -> Result<String, ShelfError> {
    let q = match field {
        "title" => format!("intitle:{query}"),
        "author" => format!("inauthor:{query}"),
        "isbn" => {
            let digits: String = query
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect();
            if digits.is_empty() {
                return Err(ShelfError::Validation(format!(
                    "isbn query `{query}` contains no digits"
                )));
            }
            format!("isbn:{digits}")
        }
        other => {
            return Err(ShelfError::Validation(format!(
                "unknown search field `{other}` for {PLUGIN_ID}"
            )));
        }
    };
    Ok(q)
}

/// Volume ids are URL-safe base64-ish tokens.
fn is_volume_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Strip markup from an HTML description and decode its entities.
fn plain_text(html: &str) -> Option<String> {
    let text = LINE_BREAKS.replace_all(html, "\n");
    let text = TAGS.replace_all(&text, "");
    non_blank(Some(decode_entities(&text).as_str()))
}

fn to_search_result(volume: Volume) -> SearchResult {
    let info = volume.volume_info;
    SearchResult {
        external_id: volume.id,
        title: info.title.clone().unwrap_or_default(),
        subtitle: join_values(&info.authors).or_else(|| non_blank(info.subtitle.as_deref())),
        image_url: info
            .image_links
            .as_ref()
            .and_then(|links| links.smallest())
            .and_then(secure_url),
    }
}

fn to_import_data(volume: Volume) -> ImportData {
    let info = volume.volume_info;
    let key = |name: &str| format!("books.{name}");

    let mut data = ImportData {
        external_id: volume.id,
        name: non_blank(info.title.as_deref()).unwrap_or_default(),
        description: info.description.as_deref().and_then(plain_text),
        image_url: info
            .image_links
            .as_ref()
            .and_then(|links| links.largest())
            .and_then(secure_url),
        ..Default::default()
    };

    data.set(key("isbn"), info.isbn());
    data.set(key("authors"), join_values(&info.authors));
    data.set(key("publisher"), non_blank(info.publisher.as_deref()));
    data.set(
        key("published_date"),
        non_blank(info.published_date.as_deref()).map(AttributeValue::Date),
    );
    data.set(key("page_count"), info.page_count.filter(|n| *n > 0));
    data.set(key("categories"), join_values(&info.categories));
    data.set(key("language"), non_blank(info.language.as_deref()));
    data
}

#[async_trait]
impl ImportPlugin for GoogleBooksPlugin {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn name(&self) -> &str {
        "Google Books"
    }

    fn description(&self) -> &str {
        "Import books by title, author, or ISBN from Google Books"
    }

    fn category_name(&self) -> &str {
        CATEGORY_NAME
    }

    fn category_description(&self) -> &str {
        "Books imported from Google Books"
    }

    fn attributes(&self) -> &[PluginAttribute] {
        &self.attributes
    }

    fn search_fields(&self) -> &[SearchField] {
        &self.search_fields
    }

    async fn search(
        &self,
        field: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, ShelfError> {
        let q = volume_query(field, query)?;
        let max_results = limit.clamp(1, MAX_RESULTS);
        let list: VolumeList = self
            .client
            .get_json(
                "volumes",
                &[
                    ("q", q),
                    ("maxResults", max_results.to_string()),
                    ("printType", "books".to_string()),
                ],
                None,
            )
            .await?;

        debug!(
            plugin_id = PLUGIN_ID,
            field,
            total = list.total_items,
            returned = list.items.len(),
            "volume search complete"
        );
        Ok(list
            .items
            .into_iter()
            .take(max_results)
            .map(to_search_result)
            .collect())
    }

    async fn fetch(&self, external_id: &str) -> Result<ImportData, ShelfError> {
        if !is_volume_id(external_id) {
            return Err(ShelfError::NotFound {
                plugin_id: PLUGIN_ID.to_string(),
                external_id: external_id.to_string(),
            });
        }
        let volume: Volume = self
            .client
            .get_json(&format!("volumes/{external_id}"), &[], Some(external_id))
            .await?;
        Ok(to_import_data(volume))
    }
}
