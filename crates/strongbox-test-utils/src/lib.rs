// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Strongbox integration tests.
//!
//! Provides an in-memory backend with fault injection and a configurable mock
//! cipher, so vault behavior can be tested deterministically without a real
//! store or real cryptography.
//!
//! # Components
//!
//! - [`MemoryBackend`] - In-memory key-value backend with injectable failures, delays and hangs
//! - [`MockCipher`] - Reversible fake cipher with an arbitrary descriptor

pub mod memory_backend;
pub mod mock_cipher;

pub use memory_backend::MemoryBackend;
pub use mock_cipher::MockCipher;
