// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry declarations and the present/absent read carrier

use crate::error::StoreError;
use std::fmt::Debug;
use std::hash::Hash;

/// An entry stored in a dictionary family, addressed by a single key.
///
/// The store keeps an owned copy of every entry; keys are value types with
/// structural equality.
pub trait KeyedEntry: Clone + Send + 'static {
    type Key: Clone + Eq + Hash + Debug + Send + 'static;

    fn key(&self) -> Self::Key;
}

/// An entry stored in a matrix family, addressed by a (row, col) cell.
pub trait CellEntry: Clone + Send + 'static {
    type Row: Clone + Eq + Hash + Debug + Send + 'static;
    type Col: Clone + Eq + Hash + Debug + Send + 'static;

    fn row(&self) -> Self::Row;
    fn col(&self) -> Self::Col;
}

/// Present-or-absent result of a non-failing read.
///
/// `try_get` always succeeds and returns one of these; only accessing the
/// entry of an absent wrapper fails.
#[derive(Clone, Debug)]
pub struct EntryWrapper<E>(Option<E>);

impl<E> EntryWrapper<E> {
    pub(crate) fn present(entry: E) -> Self {
        Self(Some(entry))
    }

    pub(crate) fn absent() -> Self {
        Self(None)
    }

    pub fn exists(&self) -> bool {
        self.0.is_some()
    }

    /// The wrapped entry; fails with [`StoreError::AbsentEntry`] if absent.
    pub fn entry(&self) -> Result<&E, StoreError> {
        self.0.as_ref().ok_or(StoreError::AbsentEntry)
    }

    /// Consume the wrapper; fails with [`StoreError::AbsentEntry`] if absent.
    pub fn into_entry(self) -> Result<E, StoreError> {
        self.0.ok_or(StoreError::AbsentEntry)
    }
}

impl<E> From<EntryWrapper<E>> for Option<E> {
    fn from(wrapper: EntryWrapper<E>) -> Self {
        wrapper.0
    }
}
