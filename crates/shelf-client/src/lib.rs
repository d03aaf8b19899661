// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound HTTP plumbing shared by every Shelf adapter.
//!
//! [`ExternalClient`] attaches per-plugin auth, enforces a request timeout,
//! and classifies every failure into the [`ShelfError`](shelf_core::ShelfError)
//! taxonomy so adapters never see raw status codes or transport errors.
//! [`PacingTable`] holds the per-plugin [`RateGate`]s the orchestrator waits
//! on before each outbound call.

pub mod classify;
pub mod client;
pub mod normalize;
pub mod pacing;

pub use classify::{classify_status, classify_transport};
pub use client::{ClientOptions, ExternalClient, PluginAuth};
pub use pacing::{PacingTable, RateGate};
