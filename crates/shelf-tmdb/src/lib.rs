// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Movie Database (TMDB) adapter for Shelf.
//!
//! Every request carries the configured v4 read access token as a bearer
//! token. Without a token the adapter fails fast with
//! [`ShelfError::Unauthorized`] instead of calling the API.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use shelf_client::normalize::{join_values, non_blank, secure_url};
use shelf_client::{ClientOptions, ExternalClient, PluginAuth};
use shelf_config::model::TmdbConfig;
use shelf_core::types::category_slug;
use shelf_core::{
    AttributeValue, DataType, ImportData, ImportPlugin, PluginAttribute, SearchField,
    SearchResult, ShelfError,
};
use tracing::debug;

use crate::types::{MovieDetails, MovieSearchPage, MovieSummary, release_year};

pub const PLUGIN_ID: &str = "tmdb";
pub const CATEGORY_NAME: &str = "Movies";

/// Poster size used in result lists.
const THUMBNAIL_SIZE: &str = "w92";
/// Poster size stored on imported assets.
const FULL_SIZE: &str = "original";

/// Movie metadata from TMDB.
pub struct TmdbPlugin {
    client: ExternalClient,
    image_base_url: String,
    language: String,
    attributes: Vec<PluginAttribute>,
    search_fields: Vec<SearchField>,
}

impl TmdbPlugin {
    pub fn new(config: &TmdbConfig, timeout: Duration) -> Result<Self, ShelfError> {
        let client = ExternalClient::new(
            PLUGIN_ID,
            ClientOptions::new(config.base_url.as_str())
                .with_auth(PluginAuth::bearer(config.api_token.as_deref()))
                .with_timeout(timeout),
        )?;
        Ok(Self::with_client(
            client,
            &config.image_base_url,
            &config.language,
        ))
    }

    pub fn with_client(client: ExternalClient, image_base_url: &str, language: &str) -> Self {
        let slug = category_slug(CATEGORY_NAME);
        let attr = |name: &str, display: &str, data_type: DataType| {
            PluginAttribute::namespaced(PLUGIN_ID, &slug, name, display, data_type)
        };
        Self {
            client,
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
            attributes: vec![
                attr("release_date", "Release Date", DataType::Date),
                attr("runtime", "Runtime (min)", DataType::Number),
                attr("genres", "Genres", DataType::String),
                attr("directors", "Directors", DataType::String),
                attr("original_title", "Original Title", DataType::String),
                attr("rating", "Rating", DataType::Number),
                attr("imdb_id", "IMDb ID", DataType::String),
            ],
            search_fields: vec![SearchField::new("title", "Title")],
        }
    }

    fn require_token(&self) -> Result<(), ShelfError> {
        if self.client.has_credential() {
            Ok(())
        } else {
            Err(ShelfError::Unauthorized {
                plugin_id: PLUGIN_ID.to_string(),
                message: "no API token configured".to_string(),
            })
        }
    }

    fn poster_url(&self, size: &str, poster_path: Option<&str>) -> Option<String> {
        let path = non_blank(poster_path)?;
        let path = path.trim_start_matches('/');
        secure_url(&format!("{}/{size}/{path}", self.image_base_url))
    }

    fn to_search_result(&self, movie: MovieSummary) -> SearchResult {
        SearchResult {
            external_id: movie.id.to_string(),
            subtitle: release_year(movie.release_date.as_deref()),
            image_url: self.poster_url(THUMBNAIL_SIZE, movie.poster_path.as_deref()),
            title: movie.title,
        }
    }

    fn to_import_data(&self, movie: MovieDetails) -> ImportData {
        let key = |name: &str| format!("movies.{name}");
        let mut data = ImportData {
            external_id: movie.id.to_string(),
            name: movie.title.trim().to_string(),
            description: non_blank(movie.overview.as_deref()),
            image_url: self.poster_url(FULL_SIZE, movie.poster_path.as_deref()),
            ..Default::default()
        };

        data.set(
            key("release_date"),
            non_blank(movie.release_date.as_deref()).map(AttributeValue::Date),
        );
        data.set(key("runtime"), movie.runtime.filter(|m| *m > 0));
        data.set(key("genres"), join_values(movie.genres.iter().map(|g| g.name.as_str())));
        data.set(key("directors"), join_values(movie.directors()));
        data.set(key("original_title"), non_blank(movie.original_title.as_deref()));
        data.set(key("rating"), movie.vote_average.filter(|r| *r > 0.0));
        data.set(key("imdb_id"), non_blank(movie.imdb_id.as_deref()));
        data
    }
}

#[async_trait]
impl ImportPlugin for TmdbPlugin {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn name(&self) -> &str {
        "The Movie Database"
    }

    fn description(&self) -> &str {
        "Import movies by title from TMDB"
    }

    fn category_name(&self) -> &str {
        CATEGORY_NAME
    }

    fn category_description(&self) -> &str {
        "Movies imported from The Movie Database"
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
        if field != "title" {
            return Err(ShelfError::Validation(format!(
                "unknown search field `{field}` for {PLUGIN_ID}"
            )));
        }
        self.require_token()?;

        let page: MovieSearchPage = self
            .client
            .get_json(
                "search/movie",
                &[
                    ("query", query.to_string()),
                    ("language", self.language.clone()),
                    ("include_adult", "false".to_string()),
                ],
                None,
            )
            .await?;

        debug!(
            plugin_id = PLUGIN_ID,
            total = page.total_results,
            returned = page.results.len(),
            "movie search complete"
        );
        Ok(page
            .results
            .into_iter()
            .take(limit)
            .map(|m| self.to_search_result(m))
            .collect())
    }

    async fn fetch(&self, external_id: &str) -> Result<ImportData, ShelfError> {
        if external_id.is_empty() || !external_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ShelfError::NotFound {
                plugin_id: PLUGIN_ID.to_string(),
                external_id: external_id.to_string(),
            });
        }
        self.require_token()?;

        let movie: MovieDetails = self
            .client
            .get_json(
                &format!("movie/{external_id}"),
                &[
                    ("append_to_response", "credits".to_string()),
                    ("language", self.language.clone()),
                ],
                Some(external_id),
            )
            .await?;
        Ok(self.to_import_data(movie))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn plugin(server: &MockServer, token: Option<&str>) -> TmdbPlugin {
        let config = TmdbConfig {
            base_url: server.uri(),
            image_base_url: "http://image.tmdb.org/t/p/".to_string(),
            api_token: token.map(str::to_string),
            ..Default::default()
        };
        TmdbPlugin::new(&config, Duration::from_secs(2)).unwrap()
    }

    fn matrix() -> serde_json::Value {
        serde_json::json!({
            "id": 603,
            "title": "The Matrix",
            "original_title": "The Matrix",
            "overview": "Set in the 22nd century...",
            "release_date": "1999-03-30",
            "runtime": 136,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "vote_average": 8.2,
            "imdb_id": "tt0133093",
            "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
            "credits": {
                "cast": [{"name": "Keanu Reeves", "character": "Neo"}],
                "crew": [
                    {"name": "Lana Wachowski", "job": "Director"},
                    {"name": "Lilly Wachowski", "job": "Director"},
                    {"name": "Joel Silver", "job": "Producer"}
                ]
            }
        })
    }

    #[tokio::test]
    async fn search_sends_bearer_and_truncates_to_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("query", "matrix"))
            .and(header("authorization", "Bearer tmdb-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "page": 1,
                "total_results": 3,
                "results": [
                    {"id": 603, "title": "The Matrix", "release_date": "1999-03-30", "poster_path": "/m.jpg"},
                    {"id": 604, "title": "The Matrix Reloaded", "release_date": "2003-05-15", "poster_path": null},
                    {"id": 605, "title": "The Matrix Revolutions", "release_date": ""}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = plugin(&server, Some("tmdb-token"))
            .search("title", "matrix", 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].external_id, "603");
        assert_eq!(results[0].subtitle.as_deref(), Some("1999"));
        assert_eq!(
            results[0].image_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w92/m.jpg")
        );
        assert_eq!(results[1].title, "The Matrix Reloaded");
        assert_eq!(results[1].image_url, None);
    }

    #[tokio::test]
    async fn missing_token_fails_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tmdb = plugin(&server, None);
        let err = tmdb.search("title", "matrix", 5).await.unwrap_err();
        assert!(matches!(err, ShelfError::Unauthorized { .. }));
        let err = tmdb.fetch("603").await.unwrap_err();
        assert!(matches!(err, ShelfError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn fetch_maps_details_and_credits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/603"))
            .and(query_param("append_to_response", "credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(matrix()))
            .mount(&server)
            .await;

        let data = plugin(&server, Some("t")).fetch("603").await.unwrap();
        assert_eq!(data.name, "The Matrix");
        assert_eq!(
            data.image_url.as_deref(),
            Some("https://image.tmdb.org/t/p/original/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg")
        );
        assert_eq!(
            data.attributes.get("movies.directors"),
            Some(&AttributeValue::Text("Lana Wachowski, Lilly Wachowski".into()))
        );
        assert_eq!(
            data.attributes.get("movies.genres"),
            Some(&AttributeValue::Text("Action, Science Fiction".into()))
        );
        assert_eq!(
            data.attributes.get("movies.runtime"),
            Some(&AttributeValue::Number(136.0))
        );
        assert_eq!(
            data.attributes.get("movies.release_date"),
            Some(&AttributeValue::Date("1999-03-30".into()))
        );
        assert_eq!(
            data.attributes.get("movies.imdb_id"),
            Some(&AttributeValue::Text("tt0133093".into()))
        );
    }

    #[tokio::test]
    async fn fetch_unknown_movie_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/999999"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "status_code": 34,
                "status_message": "The resource you requested could not be found."
            })))
            .mount(&server)
            .await;

        let err = plugin(&server, Some("t")).fetch("999999").await.unwrap_err();
        assert!(matches!(err, ShelfError::NotFound { .. }));
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(matrix()))
            .expect(0)
            .mount(&server)
            .await;

        let tmdb = plugin(&server, Some("t"));
        for id in ["tt0133093", "+603", " 603", ""] {
            let err = tmdb.fetch(id).await.unwrap_err();
            assert!(matches!(err, ShelfError::NotFound { .. }), "{id:?}");
        }
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = plugin(&server, Some("revoked"))
            .search("title", "matrix", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::Unauthorized { .. }));
    }

    #[test]
    fn declared_keys_are_namespaced() {
        let client =
            ExternalClient::new(PLUGIN_ID, ClientOptions::new("http://localhost")).unwrap();
        let tmdb = TmdbPlugin::with_client(client, "https://image.tmdb.org/t/p", "en-US");
        assert!(tmdb.attributes().iter().all(|a| a.key.starts_with("movies.")));
        assert_eq!(tmdb.search_fields().len(), 1);
    }
}
