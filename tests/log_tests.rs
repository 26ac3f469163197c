mod common;

use activity_tracker::{ActivityRecord, Details, EventLog};
use common::{event_types, obj};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_new_log_is_empty() {
    let log = EventLog::new();
    assert!(log.is_empty());
    assert_eq!(log.len(), 0);
    assert!(log.snapshot().is_empty());
}

#[test]
fn test_append_returns_index() {
    let log = EventLog::new();
    assert_eq!(log.append("a", Details::new()), 0);
    assert_eq!(log.append("b", Details::new()), 1);
    assert_eq!(log.append("c", Details::new()), 2);
    assert_eq!(log.len(), 3);
}

#[test]
fn test_snapshot_preserves_call_order() {
    let log = EventLog::new();
    for i in 0..20 {
        log.append(&format!("event_{i}"), obj(json!({"i": i})));
    }

    let records = log.snapshot();
    assert_eq!(records.len(), 20);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.event_type, format!("event_{i}"));
        assert_eq!(record.details["i"], i);
    }
}

#[test]
fn test_details_stored_exactly() {
    let log = EventLog::new();
    let details = obj(json!({
        "user": {"name": "alice", "tags": ["a", "b"]},
        "count": 3,
        "missing": null
    }));
    log.append("nested", details.clone());

    assert_eq!(log.snapshot()[0].details, details);
}

#[test]
fn test_timestamps_are_rfc3339_millis() {
    let log = EventLog::new();
    log.append("a", Details::new());

    let record = &log.snapshot()[0];
    assert!(record.instant().is_some(), "bad timestamp {}", record.timestamp);
    // 2026-10-18T09:30:00.123Z
    assert_eq!(record.timestamp.len(), 24);
    assert!(record.timestamp.ends_with('Z'));
}

#[test]
fn test_timestamps_non_decreasing() {
    let log = EventLog::new();
    for _ in 0..200 {
        log.append("tick", Details::new());
    }

    let instants: Vec<_> = log
        .snapshot()
        .iter()
        .map(|r| r.instant().unwrap())
        .collect();
    assert!(instants.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_clones_share_history() {
    let log = EventLog::new();
    let other = log.clone();
    other.append("from_clone", Details::new());

    assert_eq!(event_types(&log.snapshot()), vec!["from_clone"]);
}

#[test]
fn test_read_from_offset() {
    let log = EventLog::new();
    for t in ["a", "b", "c"] {
        log.append(t, Details::new());
    }

    assert_eq!(event_types(&log.read_from(1)), vec!["b", "c"]);
    assert!(log.read_from(3).is_empty());
    assert!(log.read_from(99).is_empty());
}

#[test]
fn test_observer_sees_each_append() {
    let log = EventLog::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    log.subscribe(move |record: &ActivityRecord| sink.borrow_mut().push(record.clone()));

    log.append("a", obj(json!({"k": 1})));
    log.append("b", Details::new());

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], log.snapshot()[0]);
    assert_eq!(seen[1].event_type, "b");
}

#[test]
fn test_observer_not_called_for_earlier_records() {
    let log = EventLog::new();
    log.append("before", Details::new());

    let count = Rc::new(RefCell::new(0));
    let c = Rc::clone(&count);
    log.subscribe(move |_| *c.borrow_mut() += 1);
    log.append("after", Details::new());

    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let log = EventLog::new();
    let count = Rc::new(RefCell::new(0));
    let c = Rc::clone(&count);
    let id = log.subscribe(move |_| *c.borrow_mut() += 1);

    log.append("a", Details::new());
    assert!(log.unsubscribe(id));
    assert!(!log.unsubscribe(id), "second unsubscribe is a no-op");
    log.append("b", Details::new());

    assert_eq!(*count.borrow(), 1);
    assert_eq!(log.observer_count(), 0);
}

#[test]
fn test_observer_can_read_log() {
    let log = EventLog::new();
    let lengths = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&lengths);
    let reader = log.clone();
    log.subscribe(move |_| sink.borrow_mut().push(reader.len()));

    log.append("a", Details::new());
    log.append("b", Details::new());

    assert_eq!(*lengths.borrow(), vec![1, 2]);
}

#[test]
fn test_observer_can_append_reentrantly() {
    let log = EventLog::new();
    let writer = log.clone();
    log.subscribe(move |record| {
        if record.event_type == "purchase_complete" {
            writer.append("receipt_shown", Details::new());
        }
    });

    log.append("purchase_complete", Details::new());
    log.append("page_view", Details::new());

    assert_eq!(
        event_types(&log.snapshot()),
        vec!["purchase_complete", "receipt_shown", "page_view"]
    );
}

#[test]
fn test_record_serializes_with_camel_case_fields() {
    let log = EventLog::new();
    log.append("click", obj(json!({"x": 1})));
    let record = &log.snapshot()[0];

    let value = serde_json::to_value(record).unwrap();
    assert_eq!(value["eventType"], "click");
    assert_eq!(value["details"]["x"], 1);
    assert_eq!(value["timestamp"], record.timestamp.as_str());
}
