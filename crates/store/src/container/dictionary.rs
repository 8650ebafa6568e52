// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dictionary family: key → indexed entry

use super::Slot;
use crate::entry::{EntryWrapper, KeyedEntry};
use crate::error::StoreError;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use weir_stream::Log;

/// The key → entry index for one dictionary family.
#[derive(Debug)]
pub struct Dictionary<E: KeyedEntry> {
    map: HashMap<E::Key, Slot<E>>,
}

impl<E: KeyedEntry> Default for Dictionary<E> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<E: KeyedEntry> Dictionary<E> {
    pub fn exists(&self, key: &E::Key) -> bool {
        self.map.contains_key(key)
    }

    /// The entry under `key`; fails with `KeyNotFound` if absent.
    pub fn get(&self, key: &E::Key) -> Result<&E, StoreError> {
        self.map
            .get(key)
            .map(|slot| &slot.entry)
            .ok_or_else(|| StoreError::key_not_found(key))
    }

    /// Non-failing read: an absent key yields an absent wrapper.
    pub fn try_get(&self, key: &E::Key) -> EntryWrapper<E> {
        match self.map.get(key) {
            Some(slot) => EntryWrapper::present(slot.entry.clone()),
            None => EntryWrapper::absent(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&E::Key, &E)> {
        self.map.iter().map(|(key, slot)| (key, &slot.entry))
    }

    /// Entries paired with the log index each slot reflects.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (u64, &E)> {
        self.map.values().map(|slot| (slot.index, &slot.entry))
    }

    /// Apply a replayed log entry.
    ///
    /// Lands only if `index` is strictly greater than the index already
    /// stored for this key, so replay is idempotent against eager updates.
    pub fn apply(&mut self, entry: E, index: u64) {
        match self.map.entry(entry.key()) {
            MapEntry::Occupied(mut slot) => {
                if index > slot.get().index {
                    *slot.get_mut() = Slot { index, entry };
                }
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Slot { index, entry });
            }
        }
    }

    /// Unconditional update bound to a freshly published index.
    pub(crate) fn overwrite(&mut self, entry: E, index: u64) {
        self.map.insert(entry.key(), Slot { index, entry });
    }
}

/// Write handle over one dictionary family inside a transaction.
///
/// Every write reaches the log before the index; both happen inside the
/// serialized worker, so no reader observes one without the other.
pub struct DictionaryMutator<'a, E: KeyedEntry, T> {
    dictionary: &'a mut Dictionary<E>,
    log: &'a Log<T>,
}

impl<'a, E, T> DictionaryMutator<'a, E, T>
where
    E: KeyedEntry,
    T: From<E> + Clone + Send + 'static,
{
    pub(crate) fn new(dictionary: &'a mut Dictionary<E>, log: &'a Log<T>) -> Self {
        Self { dictionary, log }
    }

    /// Publish and index `entry`, silently overwriting any previous entry
    /// under the same key.
    pub fn add(&mut self, entry: E) {
        let index = self.log.publish(T::from(entry.clone()));
        self.dictionary.overwrite(entry, index);
    }

    /// Like [`add`](Self::add), but fails with `KeyAlreadyExists` if the
    /// key is present at the moment of the call. Nothing is published on
    /// failure.
    pub fn insert(&mut self, entry: E) -> Result<(), StoreError> {
        if self.dictionary.exists(&entry.key()) {
            return Err(StoreError::key_already_exists(&entry.key()));
        }
        self.add(entry);
        Ok(())
    }
}

impl<'a, E: KeyedEntry, T> std::ops::Deref for DictionaryMutator<'a, E, T> {
    type Target = Dictionary<E>;

    fn deref(&self) -> &Self::Target {
        self.dictionary
    }
}

#[cfg(test)]
#[path = "dictionary_tests.rs"]
mod tests;
