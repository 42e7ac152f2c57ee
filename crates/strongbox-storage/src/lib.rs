// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite key-value backend for the Strongbox credential vault.
//!
//! All statements run on tokio-rusqlite's single background thread, so the
//! backend is safe to share between vault operations without extra locking.

pub mod backend;
pub mod migrations;

pub use backend::SqliteBackend;
