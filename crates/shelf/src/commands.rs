// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring from configuration to the import service, and command dispatch.

use std::sync::Arc;

use serde::Serialize;
use shelf_client::PacingTable;
use shelf_config::ShelfConfig;
use shelf_core::ShelfError;
use shelf_import::{ImportService, ServiceSettings};
use shelf_storage::SqliteCatalog;

use crate::Commands;

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` overrides the configured level. Logs go to stderr so stdout
/// carries only command output.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shelf={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Open storage, build the registry, and restore persisted plugin state.
pub(crate) async fn build_service(
    config: &ShelfConfig,
) -> Result<(ImportService, Arc<SqliteCatalog>), ShelfError> {
    let catalog = Arc::new(SqliteCatalog::open(&config.storage).await?);
    let pacing = Arc::new(PacingTable::new());
    let registry = shelf_plugin::builtin_catalog(config, &pacing)?;

    let service = ImportService::new(
        Arc::new(registry),
        catalog.clone(),
        catalog.clone(),
        pacing,
        ServiceSettings::from_config(&config.service),
    );
    service.restore_state().await?;
    Ok((service, catalog))
}

pub(crate) async fn run(config: &ShelfConfig, command: Commands) -> Result<(), ShelfError> {
    let (service, catalog) = build_service(config).await?;
    let outcome = execute(&service, command).await;
    let closed = catalog.close().await;
    finish(outcome, closed)
}

async fn execute(service: &ImportService, command: Commands) -> Result<(), ShelfError> {
    match command {
        Commands::Plugins => print_json(&service.list_plugins().await),
        Commands::Search {
            plugin,
            field,
            query,
            limit,
        } => print_json(&service.search(&plugin, &field, &query, limit).await?),
        Commands::Import {
            plugin,
            external_id,
        } => print_json(&service.import(&plugin, &external_id).await?),
        Commands::Enable { plugin } => print_json(&service.enable(&plugin).await?),
        Commands::Disable { plugin } => print_json(&service.disable(&plugin).await?),
    }
}

/// The command's own error wins over a failed checkpoint.
fn finish(
    outcome: Result<(), ShelfError>,
    closed: Result<(), ShelfError>,
) -> Result<(), ShelfError> {
    outcome.and(closed)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ShelfError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| ShelfError::Internal(format!("failed to render output: {e}")))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> ShelfConfig {
        let mut config = ShelfConfig::default();
        config.storage.database_path = dir.path().join("shelf.db").display().to_string();
        config
    }

    #[test]
    fn command_error_takes_precedence_over_close() {
        let err = finish(
            Err(ShelfError::Validation("bad query".into())),
            Err(ShelfError::Internal("checkpoint".into())),
        )
        .unwrap_err();
        assert!(matches!(err, ShelfError::Validation(_)));

        let err = finish(Ok(()), Err(ShelfError::Internal("checkpoint".into()))).unwrap_err();
        assert!(matches!(err, ShelfError::Internal(_)));
    }

    #[tokio::test]
    async fn failed_command_still_leaves_a_usable_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        let err = run(
            &config,
            Commands::Search {
                plugin: "nope".into(),
                field: "title".into(),
                query: "dune".into(),
                limit: 0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ShelfError::PluginNotFound { .. }));

        let (service, catalog) = build_service(&config).await.unwrap();
        assert_eq!(service.list_plugins().await.len(), 3);
        catalog.close().await.unwrap();
    }
}
