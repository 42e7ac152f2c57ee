// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams of the vault: cipher strategies and key-value backends.
//!
//! Cipher strategies are synchronous and object-safe so the vault can hold a
//! registry of `Arc<dyn CipherStrategy>` and dispatch by stored tag. Backends
//! use `#[async_trait]` because the stores they wrap complete asynchronously.

pub mod backend;
pub mod cipher;

pub use backend::KeyValueBackend;
pub use cipher::CipherStrategy;
