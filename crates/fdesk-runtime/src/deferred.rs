#![forbid(unsafe_code)]

//! Thread-backed deferred messages.
//!
//! Hosts that do not run a tick loop can let a [`DeferredTask`] deliver a
//! message after a delay instead of polling
//! [`SearchController::tick`](crate::debounce::SearchController::tick). The
//! worker sleeps on a [`CancellationToken`]; cancelling or dropping the
//! [`DeferredHandle`] wakes it and nothing is sent.

use crate::cancellation::{CancelOnDrop, CancellationSource, CancellationToken};
use std::io;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use web_time::Duration;

/// Spawns one-shot delayed deliveries.
pub struct DeferredTask;

impl DeferredTask {
    /// Send `msg` on `sender` after `delay`, unless cancelled first.
    pub fn spawn<M: Send + 'static>(
        delay: Duration,
        sender: Sender<M>,
        msg: M,
    ) -> io::Result<DeferredHandle> {
        let source = CancellationSource::new();
        let token = source.token();
        let thread = thread::Builder::new()
            .name("fdesk-deferred".into())
            .spawn(move || run(delay, &token, &sender, msg))?;
        Ok(DeferredHandle {
            guard: source.drop_guard(),
            thread: Some(thread),
        })
    }
}

fn run<M>(delay: Duration, token: &CancellationToken, sender: &Sender<M>, msg: M) {
    if token.wait_timeout(delay) {
        tracing::trace!(target: "fdesk.deferred", "cancelled before delivery");
        return;
    }
    if sender.send(msg).is_err() {
        tracing::debug!(target: "fdesk.deferred", "receiver gone; message dropped");
    }
}

/// Owner of a pending delivery. Dropping it cancels without joining.
#[derive(Debug)]
pub struct DeferredHandle {
    guard: CancelOnDrop,
    thread: Option<JoinHandle<()>>,
}

impl DeferredHandle {
    pub fn cancel(&self) {
        self.guard.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.guard.is_cancelled()
    }

    /// Whether the worker has exited (delivered or cancelled).
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel and wait for the worker to exit.
    pub fn cancel_and_join(mut self) {
        self.guard.cancel();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!(target: "fdesk.deferred", "deferred worker panicked");
        }
    }
}

/// Holds at most one pending delivery; scheduling replaces and cancels the
/// previous one.
#[derive(Debug, Default)]
pub struct DeferredSlot {
    current: Option<DeferredHandle>,
}

impl DeferredSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<M: Send + 'static>(
        &mut self,
        delay: Duration,
        sender: Sender<M>,
        msg: M,
    ) -> io::Result<()> {
        if let Some(previous) = self.current.take() {
            previous.cancel();
            tracing::trace!(target: "fdesk.deferred", "superseded pending delivery");
        }
        self.current = Some(DeferredTask::spawn(delay, sender, msg)?);
        Ok(())
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|h| !h.is_cancelled() && !h.is_finished())
    }
}
