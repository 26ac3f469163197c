mod common;

use activity_tracker::{Details, EventLog, View};
use common::{cart_reducer, counter_reducer, mount, stats_reducer, test_env, CartState, StatsState};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_new_view_has_default_state() {
    let view: View<u64> = View::<u64>::new("counter", counter_reducer);
    assert_eq!(*view.state(), 0);
    assert_eq!(view.offset(), 0);
    assert_eq!(view.name(), "counter");
}

#[test]
fn test_refresh_folds_all_records() {
    let log = EventLog::new();
    for _ in 0..5 {
        log.append("tick", Details::new());
    }

    let mut view = View::<u64>::new("counter", counter_reducer);
    assert_eq!(*view.refresh(&log), 5);
    assert_eq!(view.offset(), 5);
}

#[test]
fn test_refresh_is_incremental() {
    let log = EventLog::new();
    let mut view = View::<StatsState>::new("stats", stats_reducer);

    log.append("click", Details::new());
    log.append("scroll", Details::new());
    view.refresh(&log);

    log.append("click", Details::new());
    let state = view.refresh(&log);

    assert_eq!(state.by_type["click"], 2);
    assert_eq!(state.by_type["scroll"], 1);
    assert_eq!(state.last_event_type, "click");
    assert_eq!(view.offset(), 3);
}

#[test]
fn test_refresh_without_new_records_keeps_state() {
    let log = EventLog::new();
    log.append("tick", Details::new());
    let mut view = View::<u64>::new("counter", counter_reducer);

    view.refresh(&log);
    view.refresh(&log);

    assert_eq!(*view.state(), 1);
}

#[test]
fn test_rebuild_matches_refresh() {
    let log = EventLog::new();
    let mut view = View::<StatsState>::new("stats", stats_reducer);
    for t in ["a", "b", "a", "c"] {
        log.append(t, Details::new());
        view.refresh(&log);
    }
    let incremental = view.state().clone();

    let rebuilt = view.rebuild(&log).clone();

    assert_eq!(incremental, rebuilt);
    assert_eq!(view.offset(), 4);
}

#[test]
fn test_views_over_trackers() {
    let env = test_env();
    let tracker = mount(&env).tracker();
    let mut cart = View::<CartState>::new("cart", cart_reducer);

    tracker.track_add_to_cart(json!({"productId": "1234"}));
    tracker.track_add_to_cart(json!({"productId": "5678"}));
    tracker.track_remove_from_cart(json!({"productId": "1234"}));
    tracker.track_checkout_step(json!({"step": 1}));

    assert_eq!(
        *cart.refresh(tracker.log()),
        CartState {
            items: vec!["5678".to_string()],
            checkouts: 1,
        }
    );
}

#[test]
fn test_view_rerenders_on_each_append() {
    let log = EventLog::new();
    let view = Rc::new(RefCell::new(View::<StatsState>::new("stats", stats_reducer)));
    let renders = Rc::new(RefCell::new(Vec::new()));

    let (v, r, source) = (Rc::clone(&view), Rc::clone(&renders), log.clone());
    log.subscribe(move |_| {
        let mut view = v.borrow_mut();
        let total: u64 = view.refresh(&source).by_type.values().sum();
        r.borrow_mut().push(total);
    });

    log.append("click", Details::new());
    log.append("scroll", Details::new());
    log.append("click", Details::new());

    assert_eq!(*renders.borrow(), vec![1, 2, 3]);
    assert_eq!(view.borrow().state().by_type["click"], 2);
}
