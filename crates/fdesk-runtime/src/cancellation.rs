#![forbid(unsafe_code)]

//! Cooperative cancellation.
//!
//! A [`CancellationSource`] owns the right to cancel; any number of
//! [`CancellationToken`]s observe it. Deferred work (see
//! [`deferred`](crate::deferred)) sleeps on a token and gives up as soon as the
//! source is cancelled, so a superseded timer never delivers.
//!
//! ```
//! use fdesk_runtime::cancellation::CancellationSource;
//! use std::time::Duration;
//!
//! let source = CancellationSource::new();
//! let token = source.token();
//! source.cancel();
//! assert!(token.wait_timeout(Duration::from_secs(5)));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use web_time::{Duration, Instant};

struct Shared {
    cancelled: AtomicBool,
    wake: (Mutex<()>, Condvar),
}

/// Observer side of a cancellation pair. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

/// Control side of a cancellation pair.
///
/// Dropping a source does not cancel; use [`CancellationSource::drop_guard`]
/// for cancel-on-scope-exit.
pub struct CancellationSource {
    shared: Arc<Shared>,
}

impl CancellationSource {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                cancelled: AtomicBool::new(false),
                wake: (Mutex::new(()), Condvar::new()),
            }),
        }
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Request cancellation and wake every waiter. Idempotent.
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::Release);
        let (lock, cvar) = &self.shared.wake;
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Convert into a guard that cancels when dropped.
    pub fn drop_guard(self) -> CancelOnDrop {
        CancelOnDrop { source: Some(self) }
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSource")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationToken {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Block until cancelled or `duration` elapses.
    ///
    /// Returns `true` if cancelled, `false` on timeout. Spurious wakeups are
    /// absorbed.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        let (lock, cvar) = &self.shared.wake;
        let mut guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let deadline = Instant::now() + duration;
        loop {
            if self.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (next, _) = cvar
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            guard = next;
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Cancels its source when dropped unless [`disarm`](Self::disarm)ed.
#[derive(Debug)]
pub struct CancelOnDrop {
    source: Option<CancellationSource>,
}

impl CancelOnDrop {
    /// Cancel now.
    pub fn cancel(&self) {
        if let Some(source) = &self.source {
            source.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.source.as_ref().is_some_and(CancellationSource::is_cancelled)
    }

    /// Give back the source without cancelling.
    pub fn disarm(mut self) -> Option<CancellationSource> {
        self.source.take()
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(source) = self.source.take() {
            source.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let source = CancellationSource::new();
        assert!(!source.token().is_cancelled());
    }

    #[test]
    fn cancel_reaches_every_clone() {
        let source = CancellationSource::new();
        let a = source.token();
        let b = a.clone();
        source.cancel();
        source.cancel();
        assert!(a.is_cancelled() && b.is_cancelled());
    }

    #[test]
    fn plain_drop_does_not_cancel() {
        let source = CancellationSource::new();
        let token = source.token();
        drop(source);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn guard_cancels_on_drop() {
        let source = CancellationSource::new();
        let token = source.token();
        let guard = source.drop_guard();
        assert!(!guard.is_cancelled());
        drop(guard);
        assert!(token.is_cancelled());
    }

    #[test]
    fn disarmed_guard_leaves_token_alone() {
        let source = CancellationSource::new();
        let token = source.token();
        let recovered = source.drop_guard().disarm();
        assert!(recovered.is_some());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn wait_times_out_without_cancel() {
        let source = CancellationSource::new();
        assert!(!source.token().wait_timeout(Duration::from_millis(5)));
    }

    #[test]
    fn wait_wakes_on_cancel_from_other_thread() {
        let source = CancellationSource::new();
        let token = source.token();
        let waiter = thread::spawn(move || token.wait_timeout(Duration::from_secs(10)));
        thread::sleep(Duration::from_millis(20));
        source.cancel();
        assert!(waiter.join().unwrap());
    }
}
