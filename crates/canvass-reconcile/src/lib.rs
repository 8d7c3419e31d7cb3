// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation of the console's local document against the store's copy.
//!
//! The store offers no compare-and-swap, so every console save is a race
//! against the bot's own saves. Instead of one global rule, each top-level
//! field of the [`Document`](canvass_core::Document) has an owner and a merge
//! policy (see [`policy`]). [`reconcile`] is a pure function of the two
//! copies, which keeps the whole protocol unit-testable.

pub mod keyed;
pub mod merge;
pub mod policy;

pub use keyed::{Keyed, Removals};
pub use merge::{reconcile, Reconciler};
pub use policy::{DocumentField, FieldPolicy};
