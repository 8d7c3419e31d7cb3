// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Canvass integration tests.
//!
//! Provides an in-memory document store and document fixtures for fast,
//! deterministic tests without a live blob endpoint.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory store with failure injection and bot-side writes
//! - [`fixtures`] - Small builders for groups, submissions, and documents

pub mod fixtures;
pub mod memory_store;

pub use memory_store::MemoryStore;
