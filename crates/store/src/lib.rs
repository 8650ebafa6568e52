// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! weir-store: event-sourced, in-memory typed key/value and matrix store
//!
//! A [`Store`] owns an append-only log (`weir-stream`) and a single worker
//! task that is the sole mutator of the in-memory indexes. Writes submitted
//! through transactions reach the log exactly once before they become
//! visible; replaying the log into an empty container rebuilds the same
//! indexes.

pub mod container;
pub mod entry;
pub mod error;
mod mailbox;
pub mod schema;
pub mod store;
mod worker;

pub use container::{AxisView, Dictionary, DictionaryMutator, Matrix, MatrixMutator};
pub use entry::{CellEntry, EntryWrapper, KeyedEntry};
pub use error::StoreError;
pub use schema::{HasDictionary, HasMatrix, Schema, View};
pub use store::{DictionaryHandle, MatrixHandle, Store};

pub use weir_stream::{Control, Subscriber, Subscription};
