//! Activity tracker demo: mount, track a few things, render the log.
//!
//! Mounts a provider over a headless environment, logs a page view, a click
//! and an add-to-cart on mount, then simulates a button click, an ambient
//! page click and a scroll. A view re-renders the log after every append.

use activity_tracker::{ActivityRecord, AmbientSignal, MemoryEnvironment, Provider, View};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn render(mut lines: Vec<String>, record: &ActivityRecord) -> Vec<String> {
    let details = serde_json::to_string(&record.details).unwrap_or_default();
    lines.push(format!(
        "{}: {} at {}",
        record.event_type, details, record.timestamp
    ));
    lines
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = Rc::new(MemoryEnvironment::new(
        "https://shop.example/products",
        "Testing Activity Tracker",
    ));
    env.set_scroll(300.0, 1200.0);

    let provider = Provider::mount(env.clone());
    let tracker = provider.tracker();

    // Re-render on every change.
    let view = Rc::new(RefCell::new(View::<Vec<String>>::new("activity", render)));
    let observer_view = Rc::clone(&view);
    let observer_log = tracker.log().clone();
    let observer = tracker.log().subscribe(move |record| {
        let mut view = observer_view.borrow_mut();
        let rendered = view.refresh(&observer_log).len();
        println!("[render] {rendered} entries, latest '{}'", record.event_type);
    });

    // On mount
    tracker.track_page_view(json!({"test": "page view test"}));
    tracker.track_click(json!({
        "x": 100,
        "y": 200,
        "elementId": "test-button",
        "elementClass": "test-class",
        "str": "he clicked"
    }));
    tracker.track_add_to_cart(json!({
        "productId": "1234",
        "productName": "Sample Product",
        "price": 49.99
    }));

    // "Click to Track" button
    tracker.track_click(json!({"x": 50, "y": 75, "elementId": "button1"}));

    // Ambient events
    env.dispatch(&AmbientSignal::Click {
        client_x: 12.0,
        client_y: 34.0,
    });
    env.dispatch(&AmbientSignal::Scroll);

    tracker.track("trackSocialShare", json!({"platform": "mastodon", "contentId": "1234"}))?;

    println!("\nActivity Log");
    for line in view.borrow().state() {
        println!("  {line}");
    }

    // The observer holds a handle to the log it observes.
    tracker.log().unsubscribe(observer);
    provider.unmount();
    env.dispatch(&AmbientSignal::Scroll);
    println!(
        "\nAfter unmount: {} entries, {} listeners left",
        tracker.snapshot().len(),
        env.total_listeners()
    );

    Ok(())
}
