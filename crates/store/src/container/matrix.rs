// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Matrix family: (row, col) → indexed entry, with forward and transposed views

use super::Slot;
use crate::entry::{CellEntry, EntryWrapper};
use crate::error::StoreError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use weir_stream::Log;

/// The cell index for one matrix family.
///
/// Entries live in an arena; the cell map and both axis views hold stable
/// arena handles, so replacing a cell is a single arena write that all
/// three observe at once.
#[derive(Debug)]
pub struct Matrix<E: CellEntry> {
    arena: Vec<Slot<E>>,
    cells: HashMap<(E::Row, E::Col), usize>,
    forward: HashMap<E::Row, HashMap<E::Col, usize>>,
    transposed: HashMap<E::Col, HashMap<E::Row, usize>>,
}

impl<E: CellEntry> Default for Matrix<E> {
    fn default() -> Self {
        Self {
            arena: Vec::new(),
            cells: HashMap::new(),
            forward: HashMap::new(),
            transposed: HashMap::new(),
        }
    }
}

impl<E: CellEntry> Matrix<E> {
    pub fn exists(&self, row: &E::Row, col: &E::Col) -> bool {
        self.handle(row, col).is_some()
    }

    /// The entry at `(row, col)`; fails with `CellNotFound` if absent.
    pub fn get(&self, row: &E::Row, col: &E::Col) -> Result<&E, StoreError> {
        self.handle(row, col)
            .map(|handle| &self.arena[handle].entry)
            .ok_or_else(|| StoreError::cell_not_found(row, col))
    }

    /// Non-failing read: an absent cell yields an absent wrapper.
    pub fn try_get(&self, row: &E::Row, col: &E::Col) -> EntryWrapper<E> {
        match self.handle(row, col) {
            Some(handle) => EntryWrapper::present(self.arena[handle].entry.clone()),
            None => EntryWrapper::absent(),
        }
    }

    /// All cells in `row`; fails with `Subscript` if the row is absent.
    pub fn row(&self, row: &E::Row) -> Result<AxisView<'_, E, E::Col>, StoreError> {
        self.forward
            .get(row)
            .map(|cells| AxisView {
                arena: &self.arena,
                cells,
            })
            .ok_or_else(|| StoreError::subscript(row))
    }

    /// All cells in `col`; fails with `Subscript` if the column is absent.
    pub fn col(&self, col: &E::Col) -> Result<AxisView<'_, E, E::Row>, StoreError> {
        self.transposed
            .get(col)
            .map(|cells| AxisView {
                arena: &self.arena,
                cells,
            })
            .ok_or_else(|| StoreError::subscript(col))
    }

    pub fn rows(&self) -> impl Iterator<Item = (&E::Row, AxisView<'_, E, E::Col>)> {
        self.forward.iter().map(|(row, cells)| {
            (
                row,
                AxisView {
                    arena: &self.arena,
                    cells,
                },
            )
        })
    }

    pub fn cols(&self) -> impl Iterator<Item = (&E::Col, AxisView<'_, E, E::Row>)> {
        self.transposed.iter().map(|(col, cells)| {
            (
                col,
                AxisView {
                    arena: &self.arena,
                    cells,
                },
            )
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Apply a replayed log entry; same strictly-greater rule as the
    /// dictionary.
    pub fn apply(&mut self, entry: E, index: u64) {
        let cell = (entry.row(), entry.col());
        match self.cells.get(&cell) {
            Some(&handle) => {
                if index > self.arena[handle].index {
                    self.arena[handle] = Slot { index, entry };
                }
            }
            None => self.insert_slot(cell, entry, index),
        }
    }

    /// Unconditional update bound to a freshly published index.
    pub(crate) fn overwrite(&mut self, entry: E, index: u64) {
        let cell = (entry.row(), entry.col());
        match self.cells.get(&cell) {
            Some(&handle) => self.arena[handle] = Slot { index, entry },
            None => self.insert_slot(cell, entry, index),
        }
    }

    fn insert_slot(&mut self, cell: (E::Row, E::Col), entry: E, index: u64) {
        let handle = self.arena.len();
        self.arena.push(Slot { index, entry });
        self.forward
            .entry(cell.0.clone())
            .or_default()
            .insert(cell.1.clone(), handle);
        self.transposed
            .entry(cell.1.clone())
            .or_default()
            .insert(cell.0.clone(), handle);
        self.cells.insert(cell, handle);
    }

    fn handle(&self, row: &E::Row, col: &E::Col) -> Option<usize> {
        self.cells.get(&(row.clone(), col.clone())).copied()
    }
}

/// One row (or column) of a matrix: iteration plus subscript into entries.
#[derive(Debug)]
pub struct AxisView<'a, E: CellEntry, K> {
    arena: &'a [Slot<E>],
    cells: &'a HashMap<K, usize>,
}

impl<'a, E: CellEntry, K: Eq + Hash + Debug> AxisView<'a, E, K> {
    /// The entry under `key` on this axis; fails with `Subscript` if absent.
    pub fn get(&self, key: &K) -> Result<&'a E, StoreError> {
        self.cells
            .get(key)
            .map(|&handle| &self.arena[handle].entry)
            .ok_or_else(|| StoreError::subscript(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a K, &'a E)> {
        let arena = self.arena;
        self.cells
            .iter()
            .map(move |(key, &handle)| (key, &arena[handle].entry))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Write handle over one matrix family inside a transaction.
pub struct MatrixMutator<'a, E: CellEntry, T> {
    matrix: &'a mut Matrix<E>,
    log: &'a Log<T>,
}

impl<'a, E, T> MatrixMutator<'a, E, T>
where
    E: CellEntry,
    T: From<E> + Clone + Send + 'static,
{
    pub(crate) fn new(matrix: &'a mut Matrix<E>, log: &'a Log<T>) -> Self {
        Self { matrix, log }
    }

    /// Publish and index `entry`, silently overwriting any previous entry
    /// in the same cell.
    pub fn add(&mut self, entry: E) {
        let index = self.log.publish(T::from(entry.clone()));
        self.matrix.overwrite(entry, index);
    }

    /// Like [`add`](Self::add), but fails with `CellAlreadyExists` if the
    /// cell is occupied at the moment of the call. Nothing is published on
    /// failure.
    pub fn insert(&mut self, entry: E) -> Result<(), StoreError> {
        if self.matrix.exists(&entry.row(), &entry.col()) {
            return Err(StoreError::cell_already_exists(&entry.row(), &entry.col()));
        }
        self.add(entry);
        Ok(())
    }
}

impl<'a, E: CellEntry, T> std::ops::Deref for MatrixMutator<'a, E, T> {
    type Target = Matrix<E>;

    fn deref(&self) -> &Self::Target {
        self.matrix
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
