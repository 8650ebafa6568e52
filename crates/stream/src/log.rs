// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only in-memory entry log with replay and live tail

use crate::subscription::{Control, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

struct State<T> {
    entries: Vec<T>,
    closed: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    wake: Condvar,
}

/// An append-only, monotonically indexed sequence of entries.
///
/// Indexes are dense and start at zero. Subscribers pull entries by index
/// on their own delivery thread, so nothing is ever dropped: the log itself
/// is the delivery buffer, and it is retained in memory for replay anyway.
pub struct Log<T> {
    name: String,
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Log<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    entries: Vec::new(),
                    closed: false,
                }),
                wake: Condvar::new(),
            }),
        }
    }

    /// The name this log was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an entry and return its index. Callable from any thread.
    pub fn publish(&self, entry: T) -> u64 {
        let mut state = self.lock();
        if state.closed {
            tracing::warn!(log = %self.name, "publish on a closed log");
        }
        state.entries.push(entry);
        let index = state.entries.len() as u64 - 1;
        self.shared.wake.notify_all();
        tracing::trace!(log = %self.name, index, "published entry");
        index
    }

    /// Number of entries appended so far.
    pub fn len(&self) -> u64 {
        self.lock().entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// A copy of the entry at `index`, if it exists.
    pub fn entry(&self, index: u64) -> Option<T> {
        self.lock().entries.get(index as usize).cloned()
    }

    /// Copies of the last `n` entries, in log order.
    pub fn tail(&self, n: usize) -> Vec<T> {
        let state = self.lock();
        let skip = state.entries.len().saturating_sub(n);
        state.entries[skip..].to_vec()
    }

    /// Mark the log closed and wake delivery threads.
    ///
    /// Subscribers drain whatever is already appended, then terminate.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.shared.wake.notify_all();
        tracing::debug!(log = %self.name, entries = state.entries.len(), "log closed");
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Attach a subscriber: replay from index zero, then tail live entries.
    ///
    /// The handler receives each entry with its index and the entry count
    /// known at emission time. Entries published before the subscription
    /// are always delivered before any later ones. Delivery runs on the
    /// subscription's own thread; dropping the returned guard detaches it.
    pub fn subscribe<H: Subscriber<T>>(&self, mut handler: H) -> Subscription {
        let stop = Arc::new(AtomicBool::new(false));
        let name = self.name.clone();

        let thread_stop = Arc::clone(&stop);
        let thread_shared = Arc::clone(&self.shared);
        let handle = std::thread::spawn(move || {
            let mut next: u64 = 0;
            loop {
                let delivered = {
                    let mut state = thread_shared
                        .state
                        .lock()
                        .unwrap_or_else(|e| e.into_inner());
                    loop {
                        if thread_stop.load(Ordering::Acquire) {
                            break None;
                        }
                        if (next as usize) < state.entries.len() {
                            let total = state.entries.len() as u64;
                            break Some((state.entries[next as usize].clone(), total));
                        }
                        if state.closed {
                            break None;
                        }
                        state = thread_shared
                            .wake
                            .wait(state)
                            .unwrap_or_else(|e| e.into_inner());
                    }
                };
                match delivered {
                    Some((entry, total)) => {
                        if let Control::Stop = handler.entry(entry, next, total) {
                            break;
                        }
                        next += 1;
                    }
                    None => break,
                }
            }
            handler.terminate();
            tracing::debug!(log = %name, delivered = next, "subscriber terminated");
        });

        // The waker takes the append lock so a concurrent check-then-wait
        // in the delivery loop cannot miss the notification.
        let wake_shared = Arc::clone(&self.shared);
        let wake = Box::new(move || {
            let _guard = wake_shared
                .state
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            wake_shared.wake.notify_all();
        });
        Subscription::new(stop, wake, handle)
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.shared.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
