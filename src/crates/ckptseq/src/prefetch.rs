//! Background buffering of an upstream stage across a worker-thread boundary.
//!
//! A single producer thread owns the upstream stage and pushes `(item, token-after-item)` pairs
//! into a bounded [`std::sync::mpsc::sync_channel`] of capacity `K`; the foreground `next()` pops
//! from this channel. `sync_channel` already gives the blocking-producer / blocking-consumer
//! semantics the design calls for, so no additional condvar bookkeeping is needed for the data
//! path — only a stop flag for clean shutdown on `drop`/`setstate`, following the event-loop
//! thread pattern used elsewhere in this workspace for background work kept off the calling
//! thread (a `std::thread::spawn` producer paired with a channel and a join handle held by the
//! owning struct).
//!
//! Every queued item carries the upstream token valid *immediately after* producing that item, so
//! `getstate()` always reflects the position of the most recently **delivered** item, never the
//! further-advanced position of the producer thread — this is what makes `Prefetch` checkpoint-
//! transparent (P7): a consumer cannot observe that buffering happened at all, only that it was
//! faster.

use crate::contract::Stage;
use crate::error::{Result, StageError};
use crate::token::Token;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;

enum Message<T> {
    Item(T, Token),
    EndOfStream,
    Error(String),
}

/// Overlaps consumption of `upstream` with production, via a bounded channel of capacity `K`.
pub struct Prefetch<S: Stage> {
    buffer_size: usize,
    receiver: Option<Receiver<Message<S::Item>>>,
    worker: Option<JoinHandle<S>>,
    stop: Arc<AtomicBool>,
    last_delivered_token: Option<Token>,
    upstream_config: UpstreamHandle<S>,
}

/// Holds the upstream stage while no worker owns it (between `setstate`/`drop` and the next
/// `start`).
enum UpstreamHandle<S> {
    Idle(S),
    Running,
}

impl<S> Prefetch<S>
where
    S: Stage + Send + 'static,
    S::Item: Send + 'static,
{
    pub fn new(upstream: S, buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(StageError::InvalidArgument(
                "buffer_size must be at least 1".to_string(),
            ));
        }
        let mut prefetch = Prefetch {
            buffer_size,
            receiver: None,
            worker: None,
            stop: Arc::new(AtomicBool::new(false)),
            last_delivered_token: None,
            upstream_config: UpstreamHandle::Idle(upstream),
        };
        prefetch.start();
        Ok(prefetch)
    }

    fn start(&mut self) {
        let upstream = match std::mem::replace(&mut self.upstream_config, UpstreamHandle::Running) {
            UpstreamHandle::Idle(s) => s,
            UpstreamHandle::Running => panic!("Prefetch worker already running"),
        };
        let (tx, rx): (SyncSender<Message<S::Item>>, Receiver<Message<S::Item>>) =
            sync_channel(self.buffer_size);
        let stop = Arc::clone(&self.stop);
        stop.store(false, Ordering::SeqCst);
        let handle = std::thread::spawn(move || run_producer(upstream, tx, stop));
        self.receiver = Some(rx);
        self.worker = Some(handle);
    }

    /// Stop the worker, join it, and take back ownership of the upstream stage.
    fn stop_and_reclaim(&mut self) -> S {
        self.stop.store(true, Ordering::SeqCst);
        // Drain the channel so the worker observes the stop flag instead of blocking on a full
        // queue forever.
        if let Some(rx) = self.receiver.take() {
            while rx.try_recv().is_ok() {}
        }
        let upstream = match self.worker.take() {
            Some(handle) => handle.join().expect("prefetch worker panicked"),
            None => panic!("Prefetch worker missing"),
        };
        tracing::debug!("prefetch worker stopped");
        upstream
    }
}

fn run_producer<S>(mut upstream: S, tx: SyncSender<Message<S::Item>>, stop: Arc<AtomicBool>) -> S
where
    S: Stage,
{
    tracing::debug!("prefetch worker started");
    loop {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let message = match upstream.next() {
            Ok(Some(item)) => Message::Item(item, upstream.getstate()),
            Ok(None) => Message::EndOfStream,
            Err(e) => Message::Error(e.to_string()),
        };
        let is_terminal = matches!(message, Message::EndOfStream | Message::Error(_));
        if tx.send(message).is_err() {
            // Consumer dropped its receiver (teardown); nothing left to do.
            break;
        }
        if is_terminal {
            break;
        }
    }
    upstream
}

impl<S> Stage for Prefetch<S>
where
    S: Stage + Send + 'static,
    S::Item: Send + 'static,
{
    type Item = S::Item;

    fn next(&mut self) -> Result<Option<S::Item>> {
        let receiver = self.receiver.as_ref().expect("prefetch worker not running");
        match receiver.recv() {
            Ok(Message::Item(item, token)) => {
                self.last_delivered_token = Some(token);
                Ok(Some(item))
            }
            Ok(Message::EndOfStream) => Ok(None),
            Ok(Message::Error(msg)) => Err(StageError::Upstream(msg.into())),
            Err(_) => Ok(None),
        }
    }

    fn getstate(&self) -> Token {
        match &self.last_delivered_token {
            Some(token) => token.clone(),
            None => Token::from_value(&serde_json::Value::Null).expect("null always serializes"),
        }
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        let mut upstream = self.stop_and_reclaim();
        match &token {
            None => upstream.setstate(None)?,
            Some(t) if t.0.is_null() => upstream.setstate(None)?,
            Some(t) => upstream.setstate(Some(t.clone()))?,
        }
        self.last_delivered_token = token.filter(|t| !t.0.is_null());
        self.upstream_config = UpstreamHandle::Idle(upstream);
        self.start();
        Ok(())
    }
}

impl<S: Stage> Drop for Prefetch<S> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(rx) = self.receiver.take() {
            while rx.try_recv().is_ok() {}
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
