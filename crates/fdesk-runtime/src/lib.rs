#![forbid(unsafe_code)]

//! Runtime plumbing shared by freightdesk widgets.
//!
//! Everything here is single-threaded and clock-injected unless noted: callers
//! pass `now: Instant` from their event loop, which keeps behaviour
//! deterministic under test.
//!
//! - [`debounce`]: generation-counted debounce timer and the search controller
//!   built on it.
//! - [`deferred`]: a thread-backed deferred message for hosts that want a real
//!   timer; cancelled when its handle drops.
//! - [`cancellation`]: cooperative cancellation tokens.
//! - [`listener`]: scoped pointer listeners for outside-click detection.
//! - [`creation`]: correlation-id request/response channel for "add new" flows.
//! - [`config`]: tunables with env and file loading.

pub mod cancellation;
pub mod config;
pub mod creation;
pub mod debounce;
pub mod deferred;
pub mod listener;

pub use config::{ConfigError, WidgetConfig};
pub use creation::{
    CorrelationId, CreationError, CreationOutcome, CreationPoll, CreationRequest, PendingCreation,
    creation_channel,
};
pub use debounce::{DebounceTicket, Debouncer, SearchController};
pub use deferred::{DeferredHandle, DeferredSlot, DeferredTask};
pub use listener::{ListenerGuard, PointerListeners};
