// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-lane command queue feeding the store worker

use crate::schema::{Schema, View};
use tokio::sync::mpsc;

/// A boxed unit of work run by the worker against the container view.
pub(crate) type Task<S> = Box<dyn FnOnce(&mut View<'_, S>) + Send>;

/// What the worker does next.
pub(crate) enum Step<S: Schema> {
    /// Apply one replayed log entry to the container.
    Apply(S::Event, u64),
    /// Run one queued transaction.
    Run(Task<S>),
}

/// Consumer half of the queue: a bounded command lane with backpressure
/// and an unbounded replay lane.
///
/// Commands are bounded and never dropped: submitters wait when the lane
/// is full. The replay lane is unbounded so the rebuild delivery thread
/// can never block against a full command lane; replayed entries are
/// idempotent no-ops for anything the worker already indexed eagerly.
pub(crate) struct Mailbox<S: Schema> {
    commands: mpsc::Receiver<Task<S>>,
    applied: mpsc::UnboundedReceiver<(S::Event, u64)>,
}

/// Producer half: the command sender held by the store, the replay sender
/// held by the rebuild subscription.
pub(crate) struct MailboxSender<S: Schema> {
    pub(crate) commands: mpsc::Sender<Task<S>>,
    pub(crate) applied: mpsc::UnboundedSender<(S::Event, u64)>,
}

pub(crate) fn channel<S: Schema>(capacity: usize) -> (MailboxSender<S>, Mailbox<S>) {
    let (command_tx, command_rx) = mpsc::channel(capacity);
    let (applied_tx, applied_rx) = mpsc::unbounded_channel();
    (
        MailboxSender {
            commands: command_tx,
            applied: applied_tx,
        },
        Mailbox {
            commands: command_rx,
            applied: applied_rx,
        },
    )
}

impl<S: Schema> Mailbox<S> {
    /// The next step, replayed entries first.
    ///
    /// Returns `None` once the command lane is closed and everything
    /// pending in either lane has been handed out.
    pub(crate) async fn next(&mut self) -> Option<Step<S>> {
        // Drain replayed entries ahead of commands so a transaction
        // observes every log entry queued before it was submitted.
        if let Ok((event, index)) = self.applied.try_recv() {
            return Some(Step::Apply(event, index));
        }
        tokio::select! {
            biased;
            Some((event, index)) = self.applied.recv() => Some(Step::Apply(event, index)),
            command = self.commands.recv() => match command {
                Some(task) => Some(Step::Run(task)),
                None => self.drain_applied(),
            },
        }
    }

    fn drain_applied(&mut self) -> Option<Step<S>> {
        self.applied
            .try_recv()
            .ok()
            .map(|(event, index)| Step::Apply(event, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Dictionary;
    use crate::entry::KeyedEntry;
    use crate::schema::{HasDictionary, Schema};

    #[derive(Debug, Clone, PartialEq)]
    struct Flag {
        name: &'static str,
        on: bool,
    }

    impl KeyedEntry for Flag {
        type Key = &'static str;

        fn key(&self) -> &'static str {
            self.name
        }
    }

    #[derive(Default)]
    struct Flags {
        flags: Dictionary<Flag>,
    }

    impl Schema for Flags {
        type Event = Flag;

        fn apply(&mut self, event: Flag, index: u64) {
            self.flags.apply(event, index);
        }
    }

    impl HasDictionary<Flag> for Flags {
        fn dictionary(&self) -> &Dictionary<Flag> {
            &self.flags
        }

        fn dictionary_mut(&mut self) -> &mut Dictionary<Flag> {
            &mut self.flags
        }
    }

    fn noop_task() -> Task<Flags> {
        Box::new(|_view| {})
    }

    #[tokio::test]
    async fn replayed_entries_drain_before_commands() {
        let (sender, mut mailbox) = channel::<Flags>(4);

        sender.commands.send(noop_task()).await.unwrap();
        sender
            .applied
            .send((Flag { name: "a", on: true }, 0))
            .unwrap();

        assert!(matches!(mailbox.next().await, Some(Step::Apply(_, 0))));
        assert!(matches!(mailbox.next().await, Some(Step::Run(_))));
    }

    #[tokio::test]
    async fn closing_commands_drains_remaining_applies() {
        let (sender, mut mailbox) = channel::<Flags>(4);

        sender
            .applied
            .send((Flag { name: "a", on: true }, 0))
            .unwrap();
        drop(sender);

        assert!(matches!(mailbox.next().await, Some(Step::Apply(_, 0))));
        assert!(mailbox.next().await.is_none());
    }
}
