// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client used by adapters to reach their upstream source.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use shelf_core::ShelfError;
use tracing::debug;

use crate::classify::{classify_status, classify_transport};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a plugin authenticates against its source.
#[derive(Clone, Default)]
pub enum PluginAuth {
    #[default]
    None,
    /// `Authorization: Bearer <token>`.
    Bearer(SecretString),
    /// Credential passed as a query parameter (e.g. `key=`).
    QueryParam {
        name: &'static str,
        value: SecretString,
    },
}

impl PluginAuth {
    /// Bearer auth when a token is configured, otherwise none.
    pub fn bearer(token: Option<&str>) -> Self {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => PluginAuth::Bearer(SecretString::from(t.to_string())),
            None => PluginAuth::None,
        }
    }

    /// Query-parameter auth when a key is configured, otherwise none.
    pub fn query_param(name: &'static str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => PluginAuth::QueryParam {
                name,
                value: SecretString::from(v.to_string()),
            },
            None => PluginAuth::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PluginAuth::None)
    }
}

impl std::fmt::Debug for PluginAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginAuth::None => write!(f, "None"),
            PluginAuth::Bearer(_) => write!(f, "Bearer([REDACTED])"),
            PluginAuth::QueryParam { name, .. } => write!(f, "QueryParam({name}=[REDACTED])"),
        }
    }
}

/// Construction options for [`ExternalClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub auth: PluginAuth,
    pub timeout: Duration,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: PluginAuth::None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_auth(mut self, auth: PluginAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Outbound client bound to one plugin's source.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ExternalClient {
    plugin_id: String,
    http: reqwest::Client,
    base_url: String,
    auth: PluginAuth,
    timeout: Duration,
}

impl ExternalClient {
    pub fn new(plugin_id: &str, options: ClientOptions) -> Result<Self, ShelfError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("shelf/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| {
                ShelfError::Config(format!("failed to build HTTP client for {plugin_id}: {e}"))
            })?;

        Ok(Self {
            plugin_id: plugin_id.to_string(),
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            auth: options.auth,
            timeout: options.timeout,
        })
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when some credential is attached to requests.
    pub fn has_credential(&self) -> bool {
        !self.auth.is_none()
    }

    /// GET `path` and decode a JSON body.
    ///
    /// `external_id` marks a lookup of one record, so a 404 becomes
    /// [`ShelfError::NotFound`] rather than an unavailable upstream.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        external_id: Option<&str>,
    ) -> Result<T, ShelfError> {
        let body = self.get_text(path, query, external_id).await?;
        serde_json::from_str(&body).map_err(|e| ShelfError::Unavailable {
            plugin_id: self.plugin_id.clone(),
            message: "upstream returned malformed JSON".to_string(),
            source: Some(Box::new(e)),
        })
    }

    /// GET `path` and return the body as text (used for XML sources).
    pub async fn get_text(
        &self,
        path: &str,
        query: &[(&str, String)],
        external_id: Option<&str>,
    ) -> Result<String, ShelfError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.http.get(&url).query(query);
        request = match &self.auth {
            PluginAuth::None => request,
            PluginAuth::Bearer(token) => request.bearer_auth(token.expose_secret()),
            PluginAuth::QueryParam { name, value } => {
                request.query(&[(*name, value.expose_secret())])
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| classify_transport(&self.plugin_id, self.timeout, e))?;

        let status = response.status();
        debug!(plugin_id = %self.plugin_id, path, status = status.as_u16(), "upstream response");

        if let Some(err) = classify_status(&self.plugin_id, external_id, status) {
            return Err(err);
        }

        response
            .text()
            .await
            .map_err(|e| classify_transport(&self.plugin_id, self.timeout, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Ping {
        ok: bool,
    }

    fn client(server: &MockServer, auth: PluginAuth) -> ExternalClient {
        ExternalClient::new(
            "testsource",
            ClientOptions::new(server.uri())
                .with_auth(auth)
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn decodes_json_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(query_param("q", "dune"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let ping: Ping = client(&server, PluginAuth::None)
            .get_json("/ping", &[("q", "dune".to_string())], None)
            .await
            .unwrap();
        assert!(ping.ok);
    }

    #[tokio::test]
    async fn sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let result: Result<Ping, _> = client(&server, PluginAuth::bearer(Some("sekrit")))
            .get_json("ping", &[], None)
            .await;
        assert!(result.is_ok(), "bearer header should match: {result:?}");
    }

    #[tokio::test]
    async fn sends_query_param_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(query_param("key", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let auth = PluginAuth::query_param("key", Some("abc123"));
        let result: Result<Ping, _> = client(&server, auth).get_json("ping", &[], None).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn lookup_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server, PluginAuth::None)
            .get_text("/movie/1", &[], Some("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::NotFound { .. }));
    }

    #[tokio::test]
    async fn rejected_credentials_are_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server, PluginAuth::bearer(Some("bad")))
            .get_text("/x", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::Unauthorized { .. }));
        assert!(!err.to_string().contains("bad"), "credential leaked: {err}");
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let started = std::time::Instant::now();
        let err = client(&server, PluginAuth::None)
            .get_text("/slow", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::Unavailable { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn malformed_json_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server, PluginAuth::None)
            .get_json::<Ping>("/x", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::Unavailable { .. }));
    }

    #[test]
    fn auth_debug_is_redacted() {
        let auth = PluginAuth::bearer(Some("super-secret"));
        assert!(!format!("{auth:?}").contains("super-secret"));
        assert!(PluginAuth::bearer(Some("  ")).is_none());
    }
}
