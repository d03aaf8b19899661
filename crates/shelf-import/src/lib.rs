// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Import orchestration for Shelf.
//!
//! [`ImportService`] is the entry point used by the outer API layer. It
//! resolves plugins in the registry, paces and bounds outbound adapter
//! calls, provisions plugin schema on demand through the [`Provisioner`],
//! and persists imported assets with their provenance.

pub mod provisioner;
pub mod service;

pub use provisioner::{Provisioner, plugin_schema};
pub use service::{ImportService, ServiceSettings};
