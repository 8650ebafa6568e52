// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store parameterization: the entry universe and its family bindings

use crate::container::{Dictionary, DictionaryMutator, Matrix, MatrixMutator};
use crate::entry::{CellEntry, KeyedEntry};
use weir_stream::Log;

/// The in-memory container a store is parameterized by.
///
/// Implementors hold one index per declared entry family and route replayed
/// events to the right family in [`apply`](Self::apply). `Event` is the
/// tagged sum of every family's entry type; replaying a log into a default
/// container rebuilds the live index state, because replay routes through
/// the same strictly-greater index rule in each family.
///
/// ```ignore
/// #[derive(Default)]
/// struct Ledger {
///     accounts: Dictionary<Account>,
///     balances: Matrix<Balance>,
/// }
///
/// impl Schema for Ledger {
///     type Event = LedgerEvent;
///
///     fn apply(&mut self, event: LedgerEvent, index: u64) {
///         match event {
///             LedgerEvent::Account(entry) => self.accounts.apply(entry, index),
///             LedgerEvent::Balance(entry) => self.balances.apply(entry, index),
///         }
///     }
/// }
/// ```
pub trait Schema: Default + Send + 'static {
    /// The entry universe published to the log.
    type Event: Clone + Send + 'static;

    /// Route one replayed event into the family it belongs to.
    fn apply(&mut self, event: Self::Event, index: u64);
}

/// Binds one dictionary family of `S` to its entry type.
pub trait HasDictionary<E: KeyedEntry>: Schema {
    fn dictionary(&self) -> &Dictionary<E>;
    fn dictionary_mut(&mut self) -> &mut Dictionary<E>;
}

/// Binds one matrix family of `S` to its entry type.
pub trait HasMatrix<E: CellEntry>: Schema {
    fn matrix(&self) -> &Matrix<E>;
    fn matrix_mut(&mut self) -> &mut Matrix<E>;
}

/// The container view handed to a transaction closure.
///
/// Reads go straight to the family indexes. Writes go through mutators
/// that publish to the log before touching the index, so everything a
/// later read inside the same transaction observes has already reached
/// the log.
pub struct View<'a, S: Schema> {
    schema: &'a mut S,
    log: &'a Log<S::Event>,
}

impl<'a, S: Schema> View<'a, S> {
    pub(crate) fn new(schema: &'a mut S, log: &'a Log<S::Event>) -> Self {
        Self { schema, log }
    }

    /// Read access to the dictionary family storing `E`.
    pub fn dictionary<E: KeyedEntry>(&self) -> &Dictionary<E>
    where
        S: HasDictionary<E>,
    {
        self.schema.dictionary()
    }

    /// Write access to the dictionary family storing `E`.
    pub fn dictionary_mut<E: KeyedEntry>(&mut self) -> DictionaryMutator<'_, E, S::Event>
    where
        S: HasDictionary<E>,
        S::Event: From<E>,
    {
        DictionaryMutator::new(self.schema.dictionary_mut(), self.log)
    }

    /// Read access to the matrix family storing `E`.
    pub fn matrix<E: CellEntry>(&self) -> &Matrix<E>
    where
        S: HasMatrix<E>,
    {
        self.schema.matrix()
    }

    /// Write access to the matrix family storing `E`.
    pub fn matrix_mut<E: CellEntry>(&mut self) -> MatrixMutator<'_, E, S::Event>
    where
        S: HasMatrix<E>,
        S::Event: From<E>,
    {
        MatrixMutator::new(self.schema.matrix_mut(), self.log)
    }
}
