// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The administrator side of the shared survey document.
//!
//! A [`Console`] owns the local baseline document. Every edit is a
//! [`Mutation`] that is validated and applied to a working copy, reconciled
//! against a fresh fetch of the store, and written back in one serialized
//! cycle.

pub mod console;
pub mod mutation;

pub use console::{Console, Reconciled, RetryPolicy};
pub use mutation::{Mutation, WorkingCopy};
