// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits implemented by store backends.

pub mod store;

pub use store::DocumentStore;
