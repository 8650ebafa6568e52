// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! weir-server: wire exposure of a log as newline-delimited JSON records
//!
//! A client connects over TCP, sends one JSON request line selecting the
//! replay behavior, and receives one serialized record per line. Without a
//! selector the connection replays the log from index zero and then tails
//! it live until the client disconnects; the subscription backing the
//! connection lives exactly as long as the connection does.

use serde::{Deserialize, Serialize};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;
use weir_store::{Schema, Store};
use weir_stream::{Control, Log};

/// Replay selection sent by the client as one JSON request line.
///
/// An empty object tails the log live after full replay. `last` wins over
/// `cap` when both are present.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct Request {
    /// Deliver only the first `cap` records, then close.
    #[serde(default)]
    pub cap: Option<u64>,
    /// Deliver only the last `last` records already in the log, then close.
    #[serde(default)]
    pub last: Option<u64>,
}

/// Errors from a single client connection.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accept connections forever, one streaming task per client.
pub async fn serve<T>(log: Arc<Log<T>>, listener: TcpListener) -> io::Result<()>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    loop {
        let (socket, peer) = listener.accept().await?;
        let log = Arc::clone(&log);
        let conn = Uuid::new_v4();
        tracing::debug!(%peer, %conn, "stream client connected");
        tokio::spawn(async move {
            if let Err(e) = handle_connection(log, socket).await {
                tracing::debug!(%conn, error = %e, "stream client dropped");
            }
        });
    }
}

/// Bind `addr` and expose the store's log.
///
/// Returns the bound address and the serving task.
pub async fn expose<S>(
    store: &Store<S>,
    addr: &str,
) -> io::Result<(SocketAddr, JoinHandle<io::Result<()>>)>
where
    S: Schema,
    S::Event: Serialize + Sync,
{
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let task = tokio::spawn(serve(store.log(), listener));
    tracing::info!(addr = %local, "stream endpoint exposed");
    Ok((local, task))
}

async fn handle_connection<T>(log: Arc<Log<T>>, socket: TcpStream) -> Result<(), ServeError>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    let request: Request = match lines.next_line().await? {
        Some(line) if !line.trim().is_empty() => serde_json::from_str(&line)?,
        _ => Request::default(),
    };

    if let Some(n) = request.last {
        for entry in log.tail(n as usize) {
            write_record(&mut writer, &entry).await?;
        }
        return Ok(());
    }
    if request.cap == Some(0) {
        return Ok(());
    }

    // Replay from zero, then tail. The subscription lives exactly as long
    // as this connection; a disconnected client detaches it.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let cap = request.cap;
    let mut forwarded: u64 = 0;
    let subscription = log.subscribe(move |entry: T, _index: u64, _total: u64| {
        if tx.send(entry).is_err() {
            return Control::Stop;
        }
        forwarded += 1;
        match cap {
            Some(cap) if forwarded >= cap => Control::Stop,
            _ => Control::Continue,
        }
    });

    let result: Result<(), ServeError> = async {
        while let Some(entry) = rx.recv().await {
            write_record(&mut writer, &entry).await?;
        }
        Ok(())
    }
    .await;

    subscription.detach();
    result
}

async fn write_record<T, W>(writer: &mut W, entry: &T) -> Result<(), ServeError>
where
    T: Serialize,
    W: AsyncWriteExt + Unpin,
{
    let mut line = serde_json::to_vec(entry)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    Ok(())
}
