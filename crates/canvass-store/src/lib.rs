// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote document store backends for the Canvass survey console.

pub mod http;

pub use http::HttpDocumentStore;
