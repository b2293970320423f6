#![forbid(unsafe_code)]

//! Debounce timer and the search controller built on it.
//!
//! Both types are clock-injected: the host passes `now` on every call and
//! polls [`SearchController::tick`] from its event loop, the same way a key
//! sequence detector is fed and checked for timeouts.
//!
//! # States
//!
//! ```text
//!          set_query                 tick (now >= deadline)
//!   Idle ───────────────▶ Pending ───────────────────────────▶ Idle + callback
//!                          │  ▲
//!                          └──┘ set_query (re-arm, new generation)
//!                          │
//!                          └─── cancel / drop ──▶ Idle (no callback)
//! ```
//!
//! # Invariants
//!
//! - Every arm bumps the generation; a ticket from an earlier generation is
//!   never reported as due.
//! - At most one callback fires per quiescent period, carrying the last raw
//!   query.
//! - An empty query fires like any other.

use std::fmt;
use web_time::{Duration, Instant};

/// Default quiescence window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Identifies one arming of a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DebounceTicket(u64);

impl DebounceTicket {
    #[inline]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    Pending { ticket: DebounceTicket, deadline: Instant },
}

/// Owned debounce timer with a generation counter.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    state: TimerState,
    generation: u64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: TimerState::Idle,
            generation: 0,
        }
    }

    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Change the window. A pending deadline keeps its original value.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Start (or restart) the timer, superseding any pending ticket.
    pub fn arm(&mut self, now: Instant) -> DebounceTicket {
        self.generation = self.generation.wrapping_add(1);
        let ticket = DebounceTicket(self.generation);
        self.state = TimerState::Pending {
            ticket,
            deadline: now + self.window,
        };
        ticket
    }

    /// Drop the pending ticket, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        if was_pending {
            self.generation = self.generation.wrapping_add(1);
        }
        self.state = TimerState::Idle;
        was_pending
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, TimerState::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            TimerState::Pending { deadline, .. } => Some(deadline),
            TimerState::Idle => None,
        }
    }

    /// Whether `ticket` is still the live arming.
    pub fn is_current(&self, ticket: DebounceTicket) -> bool {
        matches!(self.state, TimerState::Pending { ticket: t, .. } if t == ticket)
    }

    /// If the pending deadline has passed, go idle and return its ticket.
    pub fn fire_due(&mut self, now: Instant) -> Option<DebounceTicket> {
        match self.state {
            TimerState::Pending { ticket, deadline } if now >= deadline => {
                self.state = TimerState::Idle;
                Some(ticket)
            }
            _ => None,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

type SearchCallback = Box<dyn FnMut(&str)>;

/// Raw and debounced query plus the timer between them.
///
/// `raw_query` follows every keystroke. `debounced_query` only moves when a
/// [`tick`](Self::tick) finds the window elapsed, and that is the value a host
/// should use to start a remote fetch.
pub struct SearchController {
    raw: String,
    debounced: String,
    debouncer: Debouncer,
    fired: u64,
    on_search: Option<SearchCallback>,
}

impl SearchController {
    pub fn new(window: Duration) -> Self {
        Self {
            raw: String::new(),
            debounced: String::new(),
            debouncer: Debouncer::new(window),
            fired: 0,
            on_search: None,
        }
    }

    /// Register a callback invoked with the debounced query on every fire.
    #[must_use]
    pub fn with_callback(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_search = Some(Box::new(callback));
        self
    }

    pub fn set_callback(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_search = Some(Box::new(callback));
    }

    /// Store `text` as the raw query and restart the window.
    pub fn set_query(&mut self, text: impl Into<String>, now: Instant) {
        self.raw = text.into();
        let superseded = self.debouncer.is_pending();
        let ticket = self.debouncer.arm(now);
        tracing::trace!(
            target: "fdesk.debounce",
            generation = ticket.generation(),
            superseded,
            len = self.raw.len(),
            "query armed"
        );
    }

    /// Fire the pending search if its window has elapsed.
    ///
    /// Returns the query that was published, exactly once per quiescent
    /// period.
    pub fn tick(&mut self, now: Instant) -> Option<String> {
        let ticket = self.debouncer.fire_due(now)?;
        self.debounced.clone_from(&self.raw);
        self.fired += 1;
        tracing::debug!(
            target: "fdesk.debounce",
            generation = ticket.generation(),
            query = %self.debounced,
            "search fired"
        );
        if let Some(callback) = self.on_search.as_mut() {
            callback(&self.debounced);
        }
        Some(self.debounced.clone())
    }

    /// Drop a pending search without firing it.
    pub fn cancel(&mut self) {
        if self.debouncer.cancel() {
            tracing::trace!(target: "fdesk.debounce", "pending search cancelled");
        }
    }

    /// Reset both queries and cancel any pending search.
    pub fn reset(&mut self) {
        self.cancel();
        self.raw.clear();
        self.debounced.clear();
    }

    #[inline]
    pub fn raw_query(&self) -> &str {
        &self.raw
    }

    #[inline]
    pub fn debounced_query(&self) -> &str {
        &self.debounced
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Number of searches fired so far.
    #[inline]
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    pub fn set_window(&mut self, window: Duration) {
        self.debouncer.set_window(window);
    }
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl fmt::Debug for SearchController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchController")
            .field("raw", &self.raw)
            .field("debounced", &self.debounced)
            .field("debouncer", &self.debouncer)
            .field("fired", &self.fired)
            .field("has_callback", &self.on_search.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const MS: Duration = Duration::from_millis(1);

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&str) + 'static) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        (calls, move |q: &str| sink.borrow_mut().push(q.to_owned()))
    }

    #[test]
    fn debouncer_fires_once_after_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(MS * 300);
        let ticket = d.arm(t0);
        assert!(d.is_current(ticket));
        assert_eq!(d.fire_due(t0 + MS * 299), None);
        assert_eq!(d.fire_due(t0 + MS * 300), Some(ticket));
        assert_eq!(d.fire_due(t0 + MS * 900), None);
        assert!(!d.is_pending());
    }

    #[test]
    fn rearm_supersedes_earlier_ticket() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        let first = d.arm(t0);
        let second = d.arm(t0 + MS * 100);
        assert!(!d.is_current(first));
        assert!(d.is_current(second));
        assert_eq!(d.fire_due(t0 + MS * 350), None);
        assert_eq!(d.fire_due(t0 + MS * 400), Some(second));
    }

    #[test]
    fn cancel_prevents_fire() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        d.arm(t0);
        assert!(d.cancel());
        assert!(!d.cancel());
        assert_eq!(d.fire_due(t0 + MS * 1000), None);
    }

    #[test]
    fn controller_publishes_final_value() {
        let t0 = Instant::now();
        let (calls, cb) = recorder();
        let mut search = SearchController::default().with_callback(cb);
        search.set_query("a", t0);
        search.set_query("ai", t0 + MS * 100);
        search.set_query("air", t0 + MS * 200);
        assert_eq!(search.raw_query(), "air");
        assert_eq!(search.debounced_query(), "");
        assert_eq!(search.tick(t0 + MS * 450), None);
        assert_eq!(search.tick(t0 + MS * 500).as_deref(), Some("air"));
        assert_eq!(search.debounced_query(), "air");
        assert_eq!(*calls.borrow(), vec!["air".to_string()]);
    }

    #[test]
    fn clearing_query_still_fires() {
        let t0 = Instant::now();
        let (calls, cb) = recorder();
        let mut search = SearchController::default().with_callback(cb);
        search.set_query("sea", t0);
        search.tick(t0 + MS * 300);
        search.set_query("", t0 + MS * 400);
        assert_eq!(search.tick(t0 + MS * 700).as_deref(), Some(""));
        assert_eq!(*calls.borrow(), vec!["sea".to_string(), String::new()]);
    }

    #[test]
    fn cancelled_search_never_fires() {
        let t0 = Instant::now();
        let (calls, cb) = recorder();
        let mut search = SearchController::default().with_callback(cb);
        search.set_query("port", t0);
        search.cancel();
        assert_eq!(search.tick(t0 + MS * 5000), None);
        assert!(calls.borrow().is_empty());
        assert_eq!(search.fired_count(), 0);
    }

    #[test]
    fn zero_window_fires_on_next_tick() {
        let t0 = Instant::now();
        let mut search = SearchController::new(Duration::ZERO);
        search.set_query("x", t0);
        assert_eq!(search.tick(t0).as_deref(), Some("x"));
    }

    proptest! {
        #[test]
        fn rapid_typing_coalesces(gaps in prop::collection::vec(0u64..300, 1..20), last in "[a-z]{0,8}") {
            let t0 = Instant::now();
            let (calls, cb) = recorder();
            let mut search = SearchController::default().with_callback(cb);
            let mut now = t0;
            for (i, gap) in gaps.iter().enumerate() {
                now += MS * *gap as u32;
                // Ticks between keystrokes never reach the deadline.
                prop_assert!(search.tick(now).is_none());
                search.set_query(format!("q{i}"), now);
            }
            search.set_query(last.clone(), now);
            prop_assert!(search.tick(now + MS * 299).is_none());
            prop_assert_eq!(search.tick(now + MS * 300), Some(last.clone()));
            prop_assert_eq!(calls.borrow().clone(), vec![last]);
        }
    }
}
