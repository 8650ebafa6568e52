// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log replay, container rebuild, and subscriber scenarios

mod common;

use common::{cell, kv, Cell, Event, KeyValue, Ledger};
use std::sync::mpsc;
use std::time::Duration;
use weir_store::{Control, Schema, Store, Subscriber};

const TICK: Duration = Duration::from_secs(2);

#[tokio::test]
async fn publishing_then_subscribing_replays_everything_in_order() {
    let store: Store<Ledger> = Store::new("replay-order");
    let values = store.dictionary::<KeyValue>();
    for key in 0..3 {
        values.add(kv(key, key as f64)).await.unwrap();
    }

    let (tx, rx) = mpsc::channel();
    let _sub = store.subscribe(move |event: Event, index: u64, _total: u64| {
        if let Event::KeyValue(entry) = event {
            tx.send((index, entry.key)).unwrap();
        }
        Control::Continue
    });

    // Replay prefix: indexes 0..N in order.
    for key in 0..3 {
        assert_eq!(rx.recv_timeout(TICK).unwrap(), (key as u64, key));
    }

    // Live tail, still in order.
    values.add(kv(7, 7.0)).await.unwrap();
    values.add(kv(8, 8.0)).await.unwrap();
    assert_eq!(rx.recv_timeout(TICK).unwrap(), (3, 7));
    assert_eq!(rx.recv_timeout(TICK).unwrap(), (4, 8));
}

struct Formatting {
    cap: u64,
    seen: u64,
    lines: Vec<String>,
    tx: mpsc::Sender<String>,
}

impl Subscriber<Event> for Formatting {
    fn entry(&mut self, event: Event, _index: u64, _total: u64) -> Control {
        if let Event::KeyValue(entry) = event {
            self.lines.push(format!("{}={:.2}", entry.key, entry.value));
        }
        self.seen += 1;
        if self.seen >= self.cap {
            Control::Stop
        } else {
            Control::Continue
        }
    }

    fn terminate(&mut self) {
        self.tx.send(self.lines.join(",")).unwrap();
    }
}

#[tokio::test]
async fn capped_listener_observes_the_full_sequence_then_terminates() {
    let store: Store<Ledger> = Store::new("capped-listener");
    let values = store.dictionary::<KeyValue>();
    values.add(kv(2, 0.5)).await.unwrap();
    values.add(kv(3, 0.33)).await.unwrap();
    values.add(kv(4, 0.25)).await.unwrap();
    values.insert(kv(5, 0.20)).await.unwrap();
    values.insert(kv(6, 0.17)).await.unwrap();
    values.insert(kv(7, 0.76)).await.unwrap();

    let (tx, rx) = mpsc::channel();
    let sub = store.subscribe(Formatting {
        cap: 6,
        seen: 0,
        lines: Vec::new(),
        tx,
    });

    let joined = tokio::task::spawn_blocking(move || sub.join());
    let observed = rx.recv_timeout(TICK).unwrap();
    joined.await.unwrap();

    assert_eq!(observed, "2=0.50,3=0.33,4=0.25,5=0.20,6=0.17,7=0.76");
}

#[tokio::test]
async fn reads_after_an_acknowledged_add_see_the_entry() {
    let store: Store<Ledger> = Store::new("read-own-write");
    let values = store.dictionary::<KeyValue>();

    // The eager local update makes the entry visible as soon as the add is
    // acknowledged, whether or not the rebuild subscription has caught up.
    for key in 0..50 {
        values.add(kv(key, key as f64)).await.unwrap();
        assert_eq!(values.get(key).await.unwrap().value, key as f64);
    }
}

#[tokio::test]
async fn replaying_the_log_rebuilds_an_equal_container() {
    let store: Store<Ledger> = Store::new("rebuild");
    let values = store.dictionary::<KeyValue>();
    let cells = store.matrix::<Cell>();

    values.add(kv(1, 1.0)).await.unwrap();
    values.add(kv(2, 2.0)).await.unwrap();
    values.add(kv(1, 1.5)).await.unwrap(); // overwrite
    cells.add(cell(1, "a", 10)).await.unwrap();
    cells.add(cell(1, "a", 11)).await.unwrap(); // overwrite
    cells.add(cell(2, "b", 20)).await.unwrap();

    // Replay the log into an independent empty container.
    let log = store.log();
    let mut rebuilt = Ledger::default();
    for index in 0..log.len() {
        rebuilt.apply(log.entry(index).unwrap(), index);
    }

    let live = store
        .transaction(|view| {
            let mut values: Vec<(i32, f64)> = view
                .dictionary::<KeyValue>()
                .iter()
                .map(|(key, entry)| (*key, entry.value))
                .collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let mut cells: Vec<(u64, String, i32)> = view
                .matrix::<Cell>()
                .rows()
                .flat_map(|(row, line)| {
                    line.iter()
                        .map(|(col, entry)| (*row, col.clone(), entry.value))
                        .collect::<Vec<_>>()
                })
                .collect();
            cells.sort();
            Ok((values, cells))
        })
        .await
        .unwrap();

    let mut rebuilt_values: Vec<(i32, f64)> = rebuilt
        .values
        .iter()
        .map(|(key, entry)| (*key, entry.value))
        .collect();
    rebuilt_values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mut rebuilt_cells: Vec<(u64, String, i32)> = rebuilt
        .cells
        .rows()
        .flat_map(|(row, line)| {
            line.iter()
                .map(|(col, entry)| (*row, col.clone(), entry.value))
                .collect::<Vec<_>>()
        })
        .collect();
    rebuilt_cells.sort();

    assert_eq!(live.0, rebuilt_values);
    assert_eq!(live.1, rebuilt_cells);
}

#[tokio::test]
async fn a_second_store_fed_from_the_log_converges() {
    let first: Store<Ledger> = Store::new("origin");
    let values = first.dictionary::<KeyValue>();
    values.add(kv(1, 0.1)).await.unwrap();
    values.add(kv(2, 0.2)).await.unwrap();
    values.add(kv(3, 0.3)).await.unwrap();
    let published = first.log().len();

    let second: Store<Ledger> = Store::new("copy");

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut forwarded = 0u64;
    let _feed = first.subscribe(move |event: Event, _index: u64, _total: u64| {
        if tx.send(event).is_err() {
            return Control::Stop;
        }
        forwarded += 1;
        if forwarded >= published {
            Control::Stop
        } else {
            Control::Continue
        }
    });

    for _ in 0..published {
        match rx.recv().await.unwrap() {
            Event::KeyValue(entry) => second.dictionary::<KeyValue>().add(entry).await.unwrap(),
            Event::Cell(entry) => second.matrix::<Cell>().add(entry).await.unwrap(),
        }
    }

    for key in 1..=3 {
        assert_eq!(
            first.dictionary::<KeyValue>().get(key).await.unwrap(),
            second.dictionary::<KeyValue>().get(key).await.unwrap()
        );
    }
}

#[tokio::test]
async fn attached_store_catches_up_before_reporting_so() {
    let first: Store<Ledger> = Store::new("handoff");
    let values = first.dictionary::<KeyValue>();
    for key in 0..20 {
        values.add(kv(key, f64::from(key) * 2.0)).await.unwrap();
    }

    // Hand the log to a fresh store; catch-up covers the full replay.
    let log = first.log();
    first.shutdown().await;

    let revived: Store<Ledger> = Store::attach(log);
    revived.caught_up().await;

    for key in 0..20 {
        assert_eq!(
            revived.dictionary::<KeyValue>().get(key).await.unwrap().value,
            f64::from(key) * 2.0
        );
    }
}
