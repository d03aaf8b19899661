// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! BoardGameGeek adapter for Shelf.
//!
//! Talks to the XML API2 `/search` and `/thing` endpoints. BGG asks clients
//! to leave several seconds between requests; the pacing gate for this
//! plugin is installed by the catalog, not here.

pub mod xml;

use std::time::Duration;

use async_trait::async_trait;
use shelf_client::normalize::{join_values, non_blank, secure_url};
use shelf_client::{ClientOptions, ExternalClient, PluginAuth};
use shelf_config::model::BggConfig;
use shelf_core::types::category_slug;
use shelf_core::{
    AttributeValue, DataType, ImportData, ImportPlugin, PluginAttribute, SearchField,
    SearchResult, ShelfError,
};
use tracing::debug;

use crate::xml::{BggItem, parse_items};

pub const PLUGIN_ID: &str = "bgg";
pub const CATEGORY_NAME: &str = "Board Games";

/// Board game metadata from BoardGameGeek.
pub struct BggPlugin {
    client: ExternalClient,
    attributes: Vec<PluginAttribute>,
    search_fields: Vec<SearchField>,
}

impl BggPlugin {
    pub fn new(config: &BggConfig, timeout: Duration) -> Result<Self, ShelfError> {
        let client = ExternalClient::new(
            PLUGIN_ID,
            ClientOptions::new(config.base_url.as_str())
                .with_auth(PluginAuth::bearer(config.api_token.as_deref()))
                .with_timeout(timeout),
        )?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: ExternalClient) -> Self {
        let slug = category_slug(CATEGORY_NAME);
        let attr = |name: &str, display: &str, data_type: DataType| {
            PluginAttribute::namespaced(PLUGIN_ID, &slug, name, display, data_type)
        };
        Self {
            client,
            attributes: vec![
                attr("year_published", "Year Published", DataType::Number),
                attr("min_players", "Min Players", DataType::Number),
                attr("max_players", "Max Players", DataType::Number),
                attr("playing_time", "Playing Time (min)", DataType::Number),
                attr("min_age", "Min Age", DataType::Number),
                attr("designers", "Designers", DataType::String),
                attr("publishers", "Publishers", DataType::String),
            ],
            search_fields: vec![SearchField::new("name", "Name")],
        }
    }

    async fn get_items(
        &self,
        path: &str,
        query: &[(&str, String)],
        external_id: Option<&str>,
    ) -> Result<Vec<BggItem>, ShelfError> {
        let body = self.client.get_text(path, query, external_id).await?;
        parse_items(&body).map_err(|e| ShelfError::Unavailable {
            plugin_id: PLUGIN_ID.to_string(),
            message: "upstream returned an unreadable XML document".to_string(),
            source: Some(Box::new(e)),
        })
    }
}

/// BGG reports unknown numeric fields as `0`.
fn positive_number(raw: Option<&str>) -> Option<AttributeValue> {
    raw?.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(AttributeValue::Number)
}

fn to_search_result(item: BggItem) -> Option<SearchResult> {
    let title = non_blank(item.name())?;
    Some(SearchResult {
        external_id: item.id,
        title,
        subtitle: item.year_published.filter(|y| y != "0"),
        image_url: item.thumbnail.as_deref().and_then(secure_url),
    })
}

fn to_import_data(item: BggItem) -> ImportData {
    let key = |name: &str| format!("boardgames.{name}");
    let mut data = ImportData {
        name: non_blank(item.name()).unwrap_or_default(),
        description: item.description.clone(),
        image_url: item
            .image
            .as_deref()
            .or(item.thumbnail.as_deref())
            .and_then(secure_url),
        ..Default::default()
    };

    data.set(key("year_published"), positive_number(item.year_published.as_deref()));
    data.set(key("min_players"), positive_number(item.min_players.as_deref()));
    data.set(key("max_players"), positive_number(item.max_players.as_deref()));
    data.set(key("playing_time"), positive_number(item.playing_time.as_deref()));
    data.set(key("min_age"), positive_number(item.min_age.as_deref()));
    data.set(key("designers"), join_values(&item.designers));
    data.set(key("publishers"), join_values(&item.publishers));
    data.external_id = item.id;
    data
}

#[async_trait]
impl ImportPlugin for BggPlugin {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn name(&self) -> &str {
        "BoardGameGeek"
    }

    fn description(&self) -> &str {
        "Import board games by name from BoardGameGeek"
    }

    fn category_name(&self) -> &str {
        CATEGORY_NAME
    }

    fn category_description(&self) -> &str {
        "Board games imported from BoardGameGeek"
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
        if field != "name" {
            return Err(ShelfError::Validation(format!(
                "unknown search field `{field}` for {PLUGIN_ID}"
            )));
        }
        let items = self
            .get_items(
                "search",
                &[
                    ("query", query.to_string()),
                    ("type", "boardgame".to_string()),
                ],
                None,
            )
            .await?;

        debug!(plugin_id = PLUGIN_ID, returned = items.len(), "board game search complete");
        Ok(items
            .into_iter()
            .filter_map(to_search_result)
            .take(limit)
            .collect())
    }

    async fn fetch(&self, external_id: &str) -> Result<ImportData, ShelfError> {
        let not_found = || ShelfError::NotFound {
            plugin_id: PLUGIN_ID.to_string(),
            external_id: external_id.to_string(),
        };
        if external_id.is_empty() || !external_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(not_found());
        }

        let items = self
            .get_items(
                "thing",
                &[("id", external_id.to_string())],
                Some(external_id),
            )
            .await?;

        let item = items
            .into_iter()
            .find(|item| item.id == external_id)
            .ok_or_else(not_found)?;
        Ok(to_import_data(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn plugin(server: &MockServer, token: Option<&str>) -> BggPlugin {
        let config = BggConfig {
            base_url: server.uri(),
            api_token: token.map(str::to_string),
            ..Default::default()
        };
        BggPlugin::new(&config, Duration::from_secs(2)).unwrap()
    }

    const CATAN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
  <item type="boardgame" id="13">
    <thumbnail>http://cf.geekdo-images.com/thumb.jpg</thumbnail>
    <image>http://cf.geekdo-images.com/full.jpg</image>
    <name type="primary" sortindex="1" value="CATAN" />
    <description>Trade, build, settle.&amp;#10;&amp;#10;Classic.</description>
    <yearpublished value="1995" />
    <minplayers value="3" />
    <maxplayers value="4" />
    <playingtime value="120" />
    <minage value="0" />
    <link type="boardgamedesigner" id="11" value="Klaus Teuber" />
    <link type="boardgamepublisher" id="37" value="KOSMOS" />
    <link type="boardgamepublisher" id="4" value="999 Games" />
  </item>
</items>"#;

    #[tokio::test]
    async fn search_maps_year_subtitle_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("query", "catan"))
            .and(query_param("type", "boardgame"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<items total="3" termsofuse="x">
                    <item type="boardgame" id="13"><name type="primary" value="CATAN"/><yearpublished value="1995"/></item>
                    <item type="boardgame" id="278"><name type="primary" value="Catan Card Game"/><yearpublished value="1996"/></item>
                    <item type="boardgame" id="926"><name type="primary" value="Catan: Cities &amp; Knights"/></item>
                </items>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let results = plugin(&server, None).search("name", "catan", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].external_id, "13");
        assert_eq!(results[0].title, "CATAN");
        assert_eq!(results[0].subtitle.as_deref(), Some("1995"));
        assert_eq!(results[1].external_id, "278");
    }

    #[tokio::test]
    async fn search_decodes_entities_in_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<items total="1"><item type="boardgame" id="926"><name type="primary" value="Catan: Cities &amp; Knights"/></item></items>"#,
            ))
            .mount(&server)
            .await;

        let results = plugin(&server, None).search("name", "knights", 10).await.unwrap();
        assert_eq!(results[0].title, "Catan: Cities & Knights");
        assert_eq!(results[0].subtitle, None);
    }

    #[tokio::test]
    async fn fetch_maps_thing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .and(query_param("id", "13"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CATAN))
            .mount(&server)
            .await;

        let data = plugin(&server, None).fetch("13").await.unwrap();
        assert_eq!(data.external_id, "13");
        assert_eq!(data.name, "CATAN");
        assert_eq!(data.description.as_deref(), Some("Trade, build, settle.\n\nClassic."));
        assert_eq!(data.image_url.as_deref(), Some("https://cf.geekdo-images.com/full.jpg"));
        assert_eq!(
            data.attributes.get("boardgames.year_published"),
            Some(&AttributeValue::Number(1995.0))
        );
        assert_eq!(
            data.attributes.get("boardgames.publishers"),
            Some(&AttributeValue::Text("KOSMOS, 999 Games".into()))
        );
        assert!(!data.attributes.contains_key("boardgames.min_age"));
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<items termsofuse="x"></items>"#),
            )
            .mount(&server)
            .await;

        let err = plugin(&server, None).fetch("99999999").await.unwrap_err();
        assert!(matches!(err, ShelfError::NotFound { .. }));
    }

    #[tokio::test]
    async fn queued_request_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let err = plugin(&server, None).fetch("13").await.unwrap_err();
        assert!(matches!(err, ShelfError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn error_document_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<errors><error><message>Rate limit exceeded.</message></error></errors>",
            ))
            .mount(&server)
            .await;

        let err = plugin(&server, None).search("name", "catan", 5).await.unwrap_err();
        assert!(matches!(err, ShelfError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn sends_optional_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer bgg-app"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<items total="0"/>"#))
            .expect(1)
            .mount(&server)
            .await;

        let results = plugin(&server, Some("bgg-app")).search("name", "zzz", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = plugin(&server, None).fetch("catan").await.unwrap_err();
        assert!(matches!(err, ShelfError::NotFound { .. }));
    }

    #[test]
    fn declared_keys_are_namespaced() {
        let client =
            ExternalClient::new(PLUGIN_ID, ClientOptions::new("http://localhost")).unwrap();
        let bgg = BggPlugin::with_client(client);
        assert_eq!(bgg.category_slug(), "boardgames");
        assert!(bgg.attributes().iter().all(|a| a.key.starts_with("boardgames.")));
    }
}
