// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod assets;
pub mod attributes;
pub mod categories;
pub mod plugin_state;
pub mod provisioning;
