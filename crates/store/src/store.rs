// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The store front-end: transactions, typed family handles, lifecycle

use crate::entry::{CellEntry, EntryWrapper, KeyedEntry};
use crate::error::StoreError;
use crate::mailbox::{self, MailboxSender, Task};
use crate::schema::{HasDictionary, HasMatrix, Schema, View};
use crate::worker;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use weir_stream::{Control, Log, Subscriber, Subscription};

/// Commands buffered before submitters feel backpressure.
const MAILBOX_CAPACITY: usize = 256;

/// An event-sourced, in-memory typed store over an append-only log.
///
/// All writes are serialized through the store's worker and reach the log
/// exactly once before they become visible; the in-memory indexes are
/// rebuilt deterministically by replaying that log. Reads and writes are
/// submitted as transactions; typed handles over the declared families
/// wrap the common single-entry operations.
pub struct Store<S: Schema> {
    log: Arc<Log<S::Event>>,
    commands: Option<mpsc::Sender<Task<S>>>,
    caught_up: watch::Receiver<bool>,
    rebuild: Option<Subscription>,
    worker: Option<JoinHandle<()>>,
}

impl<S: Schema> Store<S> {
    /// Create a store over a fresh log with the given name.
    ///
    /// Must be called from within a tokio runtime; the worker starts
    /// immediately and transactions may be submitted right away.
    pub fn new(name: impl Into<String>) -> Self {
        Self::attach(Arc::new(Log::new(name)))
    }

    /// Attach to an existing log and become its writer.
    ///
    /// The container is rebuilt by replaying the log from index zero.
    /// [`caught_up`](Self::caught_up) resolves once everything known at
    /// attach time has been replayed; reads issued earlier see whatever
    /// has been rebuilt so far.
    pub fn attach(log: Arc<Log<S::Event>>) -> Self {
        let (sender, inbox) = mailbox::channel(MAILBOX_CAPACITY);
        let MailboxSender { commands, applied } = sender;

        let snapshot = log.len();
        let (caught_up_tx, caught_up) = watch::channel(snapshot == 0);
        let rebuild = log.subscribe(move |event: S::Event, index: u64, _total: u64| {
            if applied.send((event, index)).is_err() {
                return Control::Stop;
            }
            if index + 1 >= snapshot {
                caught_up_tx.send_replace(true);
            }
            Control::Continue
        });

        let worker = worker::spawn(inbox, Arc::clone(&log));
        tracing::debug!(log = %log.name(), replaying = snapshot, "store opened");

        Self {
            log,
            commands: Some(commands),
            caught_up,
            rebuild: Some(rebuild),
            worker: Some(worker),
        }
    }

    /// The shared log behind this store.
    pub fn log(&self) -> Arc<Log<S::Event>> {
        Arc::clone(&self.log)
    }

    /// Resolves once the rebuild subscription has replayed every entry
    /// known when the store was opened. Immediate for a fresh log.
    pub async fn caught_up(&self) {
        let mut flag = self.caught_up.clone();
        // A closed channel means the rebuild subscription is gone, which
        // only happens once replay can no longer make progress.
        let _ = flag.wait_for(|done| *done).await;
    }

    /// Run `f` against the container on the worker.
    ///
    /// The closure may read and write any declared family in any order;
    /// reads observe the closure's own earlier writes. A failure returned
    /// by the closure resolves the future; the worker survives it.
    /// Dropping the future does not cancel execution.
    pub async fn transaction<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut View<'_, S>) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let task: Task<S> = Box::new(move |view: &mut View<'_, S>| {
            let _ = reply_tx.send(f(view));
        });
        self.submit(task).await?;
        reply_rx.await.map_err(|_| StoreError::Terminated)?
    }

    /// Run a read-only closure against the container; no reply.
    pub async fn apply<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&View<'_, S>) + Send + 'static,
    {
        self.submit(Box::new(move |view: &mut View<'_, S>| f(view)))
            .await
    }

    /// Attach an external subscriber to the store's log.
    pub fn subscribe<H: Subscriber<S::Event>>(&self, handler: H) -> Subscription {
        self.log.subscribe(handler)
    }

    /// Typed handle over the dictionary family storing `E`.
    pub fn dictionary<E>(&self) -> DictionaryHandle<'_, S, E>
    where
        E: KeyedEntry,
        S: HasDictionary<E>,
        S::Event: From<E>,
    {
        DictionaryHandle {
            store: self,
            _entry: PhantomData,
        }
    }

    /// Typed handle over the matrix family storing `E`.
    pub fn matrix<E>(&self) -> MatrixHandle<'_, S, E>
    where
        E: CellEntry,
        S: HasMatrix<E>,
        S::Event: From<E>,
    {
        MatrixHandle {
            store: self,
            _entry: PhantomData,
        }
    }

    /// Stop accepting work, drain the mailbox, and wait for the worker.
    ///
    /// Dropping the store has the same effect, minus the wait.
    pub async fn shutdown(mut self) {
        self.release();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }

    async fn submit(&self, task: Task<S>) -> Result<(), StoreError> {
        let commands = self.commands.as_ref().ok_or(StoreError::Terminated)?;
        commands.send(task).await.map_err(|_| StoreError::Terminated)
    }

    fn release(&mut self) {
        // Detaching the rebuild subscription closes the replay lane;
        // closing the log lets external subscribers terminate. Dropping
        // the command sender lets the worker drain and stop, resolving
        // any still-pending futures with `Terminated`.
        if let Some(rebuild) = self.rebuild.take() {
            rebuild.detach();
        }
        self.log.close();
        self.commands.take();
    }
}

impl<S: Schema> Drop for Store<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Future- and callback-based operations on one dictionary family.
///
/// Obtained from [`Store::dictionary`]; every call is one transaction.
pub struct DictionaryHandle<'s, S: Schema, E> {
    store: &'s Store<S>,
    _entry: PhantomData<E>,
}

impl<'s, S, E> DictionaryHandle<'s, S, E>
where
    S: HasDictionary<E>,
    S::Event: From<E>,
    E: KeyedEntry,
{
    /// The entry under `key`; fails with `KeyNotFound`.
    pub async fn get(&self, key: E::Key) -> Result<E, StoreError> {
        self.store
            .transaction(move |view| view.dictionary::<E>().get(&key).map(E::clone))
            .await
    }

    /// Non-failing read: an absent key yields an absent wrapper.
    pub async fn try_get(&self, key: E::Key) -> Result<EntryWrapper<E>, StoreError> {
        self.store
            .transaction(move |view| Ok(view.dictionary::<E>().try_get(&key)))
            .await
    }

    pub async fn exists(&self, key: E::Key) -> Result<bool, StoreError> {
        self.store
            .transaction(move |view| Ok(view.dictionary::<E>().exists(&key)))
            .await
    }

    /// Publish `entry`, silently overwriting any previous entry under the
    /// same key.
    pub async fn add(&self, entry: E) -> Result<(), StoreError> {
        self.store
            .transaction(move |view| {
                view.dictionary_mut::<E>().add(entry);
                Ok(())
            })
            .await
    }

    /// Publish `entry`; fails with `KeyAlreadyExists` if the key is taken.
    pub async fn insert(&self, entry: E) -> Result<(), StoreError> {
        self.store
            .transaction(move |view| view.dictionary_mut::<E>().insert(entry))
            .await
    }

    /// Callback read: exactly one of `found` / `missing` runs, on the
    /// worker. No failure surfaces anywhere else.
    pub async fn get_with<F, M>(
        &self,
        key: E::Key,
        found: F,
        missing: M,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(E) + Send + 'static,
        M: FnOnce(E::Key) + Send + 'static,
    {
        self.store
            .apply(move |view| match view.dictionary::<E>().try_get(&key).into_entry() {
                Ok(entry) => found(entry),
                Err(_) => missing(key),
            })
            .await
    }

    /// Callback write: `done` on success, `exists` with the rejected entry
    /// if the key is taken.
    pub async fn insert_with<D, X>(
        &self,
        entry: E,
        done: D,
        exists: X,
    ) -> Result<(), StoreError>
    where
        D: FnOnce() + Send + 'static,
        X: FnOnce(E) + Send + 'static,
    {
        self.store
            .transaction(move |view| {
                let mut dictionary = view.dictionary_mut::<E>();
                if dictionary.exists(&entry.key()) {
                    exists(entry);
                } else {
                    dictionary.add(entry);
                    done();
                }
                Ok(())
            })
            .await
    }
}

/// Future- and callback-based operations on one matrix family.
///
/// Obtained from [`Store::matrix`]; every call is one transaction.
pub struct MatrixHandle<'s, S: Schema, E> {
    store: &'s Store<S>,
    _entry: PhantomData<E>,
}

impl<'s, S, E> MatrixHandle<'s, S, E>
where
    S: HasMatrix<E>,
    S::Event: From<E>,
    E: CellEntry,
{
    /// The entry at `(row, col)`; fails with `CellNotFound`.
    pub async fn get(&self, row: E::Row, col: E::Col) -> Result<E, StoreError> {
        self.store
            .transaction(move |view| view.matrix::<E>().get(&row, &col).map(E::clone))
            .await
    }

    /// Non-failing read: an absent cell yields an absent wrapper.
    pub async fn try_get(&self, row: E::Row, col: E::Col) -> Result<EntryWrapper<E>, StoreError> {
        self.store
            .transaction(move |view| Ok(view.matrix::<E>().try_get(&row, &col)))
            .await
    }

    pub async fn exists(&self, row: E::Row, col: E::Col) -> Result<bool, StoreError> {
        self.store
            .transaction(move |view| Ok(view.matrix::<E>().exists(&row, &col)))
            .await
    }

    /// Publish `entry`, silently overwriting any previous entry in the
    /// same cell.
    pub async fn add(&self, entry: E) -> Result<(), StoreError> {
        self.store
            .transaction(move |view| {
                view.matrix_mut::<E>().add(entry);
                Ok(())
            })
            .await
    }

    /// Publish `entry`; fails with `CellAlreadyExists` if the cell is
    /// occupied.
    pub async fn insert(&self, entry: E) -> Result<(), StoreError> {
        self.store
            .transaction(move |view| view.matrix_mut::<E>().insert(entry))
            .await
    }

    /// Callback read: exactly one of `found` / `missing` runs, on the
    /// worker.
    pub async fn get_with<F, M>(
        &self,
        row: E::Row,
        col: E::Col,
        found: F,
        missing: M,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(E) + Send + 'static,
        M: FnOnce(E::Row, E::Col) + Send + 'static,
    {
        self.store
            .apply(
                move |view| match view.matrix::<E>().try_get(&row, &col).into_entry() {
                    Ok(entry) => found(entry),
                    Err(_) => missing(row, col),
                },
            )
            .await
    }

    /// Callback write: `done` on success, `exists` with the rejected entry
    /// if the cell is occupied.
    pub async fn insert_with<D, X>(
        &self,
        entry: E,
        done: D,
        exists: X,
    ) -> Result<(), StoreError>
    where
        D: FnOnce() + Send + 'static,
        X: FnOnce(E) + Send + 'static,
    {
        self.store
            .transaction(move |view| {
                let mut matrix = view.matrix_mut::<E>();
                if matrix.exists(&entry.row(), &entry.col()) {
                    exists(entry);
                } else {
                    matrix.add(entry);
                    done();
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
