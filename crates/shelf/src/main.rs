// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shelf - import books, movies, and board games from external catalogs.
//!
//! This is the binary entry point. Every subcommand maps onto one
//! import-service operation and prints its result as JSON.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Shelf - import catalog records as typed assets.
#[derive(Parser, Debug)]
#[command(name = "shelf", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered plugins and their state.
    Plugins,
    /// Search a plugin's source by one of its search fields.
    Search {
        plugin: String,
        field: String,
        query: String,
        /// Maximum number of results (0 uses the configured default).
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// Fetch a record and store it as an asset.
    Import { plugin: String, external_id: String },
    /// Provision a plugin's category and attributes.
    Enable { plugin: String },
    /// Disable a plugin, removing its schema when no asset uses it.
    Disable { plugin: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => shelf_config::load_and_validate_path(path),
        None => shelf_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            shelf_config::render_errors(&errors);
            return ExitCode::from(2);
        }
    };

    commands::init_tracing(&config.service.log_level);

    match commands::run(&config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("shelf: {}", err.public_message());
            if err.is_client_fault() {
                ExitCode::from(1)
            } else {
                ExitCode::from(2)
            }
        }
    }
}
