// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single mutator task behind a store

use crate::mailbox::{Mailbox, Step};
use crate::schema::{Schema, View};
use std::sync::Arc;
use tokio::task::JoinHandle;
use weir_stream::Log;

/// Spawn the worker that owns the container for one store.
///
/// The worker is the only code that touches the container. It runs queued
/// transactions to completion in dequeue order, applies replayed log
/// entries between them, and drains whatever is pending once the command
/// lane closes.
pub(crate) fn spawn<S: Schema>(mut mailbox: Mailbox<S>, log: Arc<Log<S::Event>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut schema = S::default();
        while let Some(step) = mailbox.next().await {
            match step {
                Step::Apply(event, index) => schema.apply(event, index),
                Step::Run(task) => {
                    let mut view = View::new(&mut schema, &log);
                    task(&mut view);
                }
            }
        }
        tracing::debug!(log = %log.name(), "store worker stopped");
    })
}
