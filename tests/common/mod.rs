#![allow(dead_code)]

use activity_tracker::{ActivityRecord, Details, MemoryEnvironment, Provider};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;

pub fn test_env() -> Rc<MemoryEnvironment> {
    let env = MemoryEnvironment::new("https://shop.test/products?id=7", "Products");
    env.set_referrer("https://search.test/?q=shoes");
    env.set_scroll(250.0, 1000.0);
    Rc::new(env)
}

pub fn mount(env: &Rc<MemoryEnvironment>) -> Provider {
    Provider::mount(env.clone())
}

/// Object payload from a `json!` literal.
pub fn obj(value: Value) -> Details {
    value.as_object().cloned().expect("expected a JSON object")
}

pub fn event_types(records: &[ActivityRecord]) -> Vec<String> {
    records.iter().map(|r| r.event_type.clone()).collect()
}

pub fn counter_reducer(state: u64, _record: &ActivityRecord) -> u64 {
    state + 1
}

#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<String>,
    pub checkouts: u64,
}

pub fn cart_reducer(mut state: CartState, record: &ActivityRecord) -> CartState {
    match record.event_type.as_str() {
        "add_to_cart" => {
            let id = record.details["productId"].as_str().unwrap_or("").to_string();
            state.items.push(id);
        }
        "remove_from_cart" => {
            let id = record.details["productId"].as_str().unwrap_or("");
            if let Some(pos) = state.items.iter().position(|i| i == id) {
                state.items.remove(pos);
            }
        }
        "checkout_step" => state.checkouts += 1,
        _ => {}
    }
    state
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct StatsState {
    pub by_type: HashMap<String, u64>,
    pub last_event_type: String,
}

pub fn stats_reducer(mut state: StatsState, record: &ActivityRecord) -> StatsState {
    *state.by_type.entry(record.event_type.clone()).or_insert(0) += 1;
    state.last_event_type = record.event_type.clone();
    state
}
