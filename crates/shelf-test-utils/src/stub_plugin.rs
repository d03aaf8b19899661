// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable import plugin for deterministic testing.
//!
//! `StubPlugin` is the "testbooks" source: category `TestBooks`, one
//! attribute `testbooks.isbn` (string), and one search field `title`.
//! Results, records, delays, and failures are set per test; every call
//! into `search`/`fetch` is counted before any delay or failure applies.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shelf_core::{
    DataType, ImportData, ImportPlugin, PluginAttribute, SearchField, SearchResult, ShelfError,
};

pub const PLUGIN_ID: &str = "testbooks";

/// Which call a scripted failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Search,
    Fetch,
}

type FailureFactory = Box<dyn Fn() -> ShelfError + Send + Sync>;

/// A stub adapter with pre-configured results.
pub struct StubPlugin {
    attributes: Vec<PluginAttribute>,
    search_fields: Vec<SearchField>,
    results: Mutex<Vec<SearchResult>>,
    records: Mutex<HashMap<String, ImportData>>,
    delay: Mutex<Duration>,
    failures: Mutex<Vec<(Call, FailureFactory)>>,
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl StubPlugin {
    pub fn new() -> Self {
        Self {
            attributes: vec![PluginAttribute::namespaced(
                PLUGIN_ID,
                "testbooks",
                "isbn",
                "ISBN",
                DataType::String,
            )],
            search_fields: vec![SearchField::new("title", "Title")],
            results: Mutex::new(Vec::new()),
            records: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::ZERO),
            failures: Mutex::new(Vec::new()),
            search_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Results returned by every search, regardless of query.
    pub fn with_results(self, results: Vec<SearchResult>) -> Self {
        *lock(&self.results) = results;
        self
    }

    /// Record returned when `external_id` is fetched.
    pub fn with_record(self, external_id: &str, record: ImportData) -> Self {
        lock(&self.records).insert(external_id.to_string(), record);
        self
    }

    /// Delay applied to every call before it answers.
    pub fn with_delay(self, delay: Duration) -> Self {
        *lock(&self.delay) = delay;
        self
    }

    /// Make every search fail with the error `make` builds.
    pub fn fail_search(self, make: impl Fn() -> ShelfError + Send + Sync + 'static) -> Self {
        lock(&self.failures).push((Call::Search, Box::new(make)));
        self
    }

    /// Make every fetch fail with the error `make` builds.
    pub fn fail_fetch(self, make: impl Fn() -> ShelfError + Send + Sync + 'static) -> Self {
        lock(&self.failures).push((Call::Fetch, Box::new(make)));
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Total calls that reached the adapter.
    pub fn calls(&self) -> usize {
        self.search_calls() + self.fetch_calls()
    }

    async fn answer(&self, call: Call) -> Result<(), ShelfError> {
        let delay = *lock(&self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match lock(&self.failures).iter().find(|(c, _)| *c == call) {
            Some((_, make)) => Err(make()),
            None => Ok(()),
        }
    }
}

impl Default for StubPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ImportPlugin for StubPlugin {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn name(&self) -> &str {
        "Test Books"
    }

    fn description(&self) -> &str {
        "Scriptable book source for tests"
    }

    fn category_name(&self) -> &str {
        "TestBooks"
    }

    fn category_description(&self) -> &str {
        "Books imported from the test source"
    }

    fn attributes(&self) -> &[PluginAttribute] {
        &self.attributes
    }

    fn search_fields(&self) -> &[SearchField] {
        &self.search_fields
    }

    async fn search(
        &self,
        _field: &str,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, ShelfError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(Call::Search).await?;
        let mut results = lock(&self.results).clone();
        results.truncate(limit);
        Ok(results)
    }

    async fn fetch(&self, external_id: &str) -> Result<ImportData, ShelfError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(Call::Fetch).await?;
        lock(&self.records)
            .get(external_id)
            .cloned()
            .ok_or_else(|| ShelfError::NotFound {
                plugin_id: PLUGIN_ID.to_string(),
                external_id: external_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_calls_and_returns_canned_data() {
        let stub = StubPlugin::new()
            .with_results(vec![SearchResult {
                external_id: "42".into(),
                title: "Dune".into(),
                subtitle: None,
                image_url: None,
            }])
            .with_record(
                "42",
                ImportData {
                    external_id: "42".into(),
                    name: "Dune".into(),
                    ..Default::default()
                },
            );

        assert_eq!(stub.search("title", "dune", 10).await.unwrap().len(), 1);
        assert_eq!(stub.fetch("42").await.unwrap().name, "Dune");
        assert!(matches!(
            stub.fetch("43").await.unwrap_err(),
            ShelfError::NotFound { .. }
        ));
        assert_eq!(stub.search_calls(), 1);
        assert_eq!(stub.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn scripted_failures_apply_per_call() {
        let stub = StubPlugin::new().fail_fetch(|| ShelfError::unavailable(PLUGIN_ID, "HTTP 503"));
        assert!(stub.search("title", "x", 5).await.unwrap().is_empty());
        assert!(matches!(
            stub.fetch("1").await.unwrap_err(),
            ShelfError::Unavailable { .. }
        ));
        assert_eq!(stub.calls(), 2);
    }
}
