#![forbid(unsafe_code)]

//! Request/response channel for "add new" flows.
//!
//! When a selector's "add new" row is activated it keeps a [`PendingCreation`]
//! and hands the matching [`CreationRequest`] to whoever runs the creation
//! dialog. The dialog answers with [`CreationRequest::complete`] or
//! [`CreationRequest::cancel`]; the selector polls and turns a created id into
//! a change event.
//!
//! If the selector is gone by the time the answer arrives, the answer fails
//! with [`CreationError::Detached`] instead of reaching a dead callback.
//!
//! ```
//! use fdesk_runtime::creation::{creation_channel, CreationPoll};
//!
//! let (request, mut pending) = creation_channel("acme");
//! assert_eq!(request.seed_query(), "acme");
//! request.complete("P-42").unwrap();
//! assert_eq!(pending.poll(), CreationPoll::Created("P-42".into()));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

static NEXT_CORRELATION: AtomicU64 = AtomicU64::new(1);

/// Ties a request to the selector that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(u64);

impl CorrelationId {
    fn next() -> Self {
        Self(NEXT_CORRELATION.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "create#{}", self.0)
    }
}

/// How a creation flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    /// A record was created with this id.
    Created(String),
    Cancelled,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CreationError {
    #[error("creation request {correlation} has no live requester")]
    Detached { correlation: CorrelationId },
}

/// Collaborator half: answer exactly once.
#[derive(Debug)]
pub struct CreationRequest {
    correlation: CorrelationId,
    seed_query: String,
    reply: Sender<(CorrelationId, CreationOutcome)>,
}

/// Requester half, polled by the selector.
#[derive(Debug)]
pub struct PendingCreation {
    correlation: CorrelationId,
    inbox: Receiver<(CorrelationId, CreationOutcome)>,
    settled: bool,
}

/// Result of [`PendingCreation::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationPoll {
    Waiting,
    Created(String),
    /// Explicit cancel, or the request was dropped unanswered.
    Cancelled,
}

/// Open a request/response pair. `seed_query` is the search text the user had
/// typed, offered to the dialog as a starting name.
pub fn creation_channel(seed_query: impl Into<String>) -> (CreationRequest, PendingCreation) {
    let (tx, rx) = mpsc::channel();
    let correlation = CorrelationId::next();
    let seed_query = seed_query.into();
    tracing::debug!(
        target: "fdesk.creation",
        %correlation,
        seed = %seed_query,
        "creation requested"
    );
    (
        CreationRequest {
            correlation,
            seed_query,
            reply: tx,
        },
        PendingCreation {
            correlation,
            inbox: rx,
            settled: false,
        },
    )
}

impl CreationRequest {
    #[inline]
    pub fn correlation(&self) -> CorrelationId {
        self.correlation
    }

    pub fn seed_query(&self) -> &str {
        &self.seed_query
    }

    /// Report the id of the newly created record.
    pub fn complete(self, id: impl Into<String>) -> Result<(), CreationError> {
        self.answer(CreationOutcome::Created(id.into()))
    }

    /// Report that the user abandoned the flow.
    pub fn cancel(self) -> Result<(), CreationError> {
        self.answer(CreationOutcome::Cancelled)
    }

    fn answer(self, outcome: CreationOutcome) -> Result<(), CreationError> {
        let correlation = self.correlation;
        match self.reply.send((correlation, outcome)) {
            Ok(()) => {
                tracing::debug!(target: "fdesk.creation", %correlation, "creation answered");
                Ok(())
            }
            Err(_) => {
                tracing::warn!(target: "fdesk.creation", %correlation, "requester dropped before answer");
                Err(CreationError::Detached { correlation })
            }
        }
    }
}

impl PendingCreation {
    #[inline]
    pub fn correlation(&self) -> CorrelationId {
        self.correlation
    }

    /// Check for an answer without blocking. Once settled, stays `Cancelled`.
    pub fn poll(&mut self) -> CreationPoll {
        if self.settled {
            return CreationPoll::Cancelled;
        }
        match self.inbox.try_recv() {
            Ok((correlation, outcome)) if correlation == self.correlation => {
                self.settled = true;
                match outcome {
                    CreationOutcome::Created(id) => CreationPoll::Created(id),
                    CreationOutcome::Cancelled => CreationPoll::Cancelled,
                }
            }
            Ok((correlation, _)) => {
                tracing::warn!(
                    target: "fdesk.creation",
                    expected = %self.correlation,
                    got = %correlation,
                    "mismatched creation answer ignored"
                );
                CreationPoll::Waiting
            }
            Err(TryRecvError::Empty) => CreationPoll::Waiting,
            Err(TryRecvError::Disconnected) => {
                self.settled = true;
                CreationPoll::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_ids_are_unique() {
        let (a, _pa) = creation_channel("");
        let (b, _pb) = creation_channel("");
        assert_ne!(a.correlation(), b.correlation());
    }

    #[test]
    fn waiting_until_answered() {
        let (request, mut pending) = creation_channel("best");
        assert_eq!(pending.poll(), CreationPoll::Waiting);
        assert_eq!(pending.correlation(), request.correlation());
        request.complete("P-7").unwrap();
        assert_eq!(pending.poll(), CreationPoll::Created("P-7".into()));
    }

    #[test]
    fn explicit_cancel() {
        let (request, mut pending) = creation_channel("");
        request.cancel().unwrap();
        assert_eq!(pending.poll(), CreationPoll::Cancelled);
    }

    #[test]
    fn dropped_request_reads_as_cancelled() {
        let (request, mut pending) = creation_channel("");
        drop(request);
        assert_eq!(pending.poll(), CreationPoll::Cancelled);
        assert_eq!(pending.poll(), CreationPoll::Cancelled);
    }

    #[test]
    fn answer_to_dropped_requester_is_detached() {
        let (request, pending) = creation_channel("");
        let correlation = request.correlation();
        drop(pending);
        assert_eq!(
            request.complete("P-1"),
            Err(CreationError::Detached { correlation })
        );
    }

    #[test]
    fn settled_pending_ignores_later_polls() {
        let (request, mut pending) = creation_channel("");
        request.complete("X").unwrap();
        assert!(matches!(pending.poll(), CreationPoll::Created(_)));
        assert_eq!(pending.poll(), CreationPoll::Cancelled);
    }
}
