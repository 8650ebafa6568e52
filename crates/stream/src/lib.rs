// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! weir-stream: append-only in-memory log with ordered multi-subscriber replay
//!
//! A [`Log`] is a monotonically indexed sequence of entries. Subscribers
//! replay the log from index zero and then tail it live; publishing never
//! waits on subscriber progress beyond the append lock.

pub mod log;
pub mod subscription;

pub use log::Log;
pub use subscription::{Control, Subscriber, Subscription};
