//! End-to-end runtime flows: debounced search with a real timer thread, and
//! the creation round-trip.

use fdesk_runtime::{
    CreationError, CreationPoll, DeferredSlot, SearchController, WidgetConfig, creation_channel,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use web_time::{Duration, Instant};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

#[test]
fn config_window_drives_controller() {
    init_tracing();
    let config = WidgetConfig::default().with_debounce_ms(120);
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let mut search = SearchController::new(config.debounce())
        .with_callback(move |q: &str| sink.borrow_mut().push(q.to_owned()));

    let t0 = Instant::now();
    for (i, prefix) in ["s", "sh", "shi", "ship"].iter().enumerate() {
        search.set_query(*prefix, t0 + Duration::from_millis(50 * i as u64));
    }
    assert!(search.tick(t0 + Duration::from_millis(200)).is_none());
    assert_eq!(
        search.tick(t0 + Duration::from_millis(270)).as_deref(),
        Some("ship")
    );
    assert_eq!(calls.borrow().as_slice(), ["ship".to_string()]);
}

#[test]
fn threaded_timer_only_delivers_latest_query() {
    init_tracing();
    let (tx, rx) = mpsc::channel::<String>();
    let mut slot = DeferredSlot::new();
    for query in ["a", "ac", "acm", "acme"] {
        slot.schedule(Duration::from_millis(60), tx.clone(), query.to_string())
            .unwrap();
    }
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)).as_deref(),
        Ok("acme")
    );
    assert!(rx.recv_timeout(Duration::from_millis(250)).is_err());
}

#[test]
fn creation_answer_crosses_threads() {
    init_tracing();
    let (request, mut pending) = creation_channel("Globex");
    let worker = std::thread::spawn(move || {
        let name = request.seed_query().to_uppercase();
        request.complete(format!("P-{name}"))
    });
    assert_eq!(worker.join().unwrap(), Ok(()));
    assert_eq!(pending.poll(), CreationPoll::Created("P-GLOBEX".into()));
}

#[test]
fn answer_after_requester_dropped_is_detached() {
    init_tracing();
    let (request, pending) = creation_channel("");
    drop(pending);
    assert!(matches!(
        request.complete("P-1"),
        Err(CreationError::Detached { .. })
    ));
}
