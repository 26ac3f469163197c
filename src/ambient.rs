use crate::catalog::find_builtin;
use crate::env::{AmbientEvent, AmbientSignal, Environment, Handler, ListenerId};
use crate::event::{iso_timestamp, Details};
use crate::log::EventLog;
use chrono::Utc;
use serde_json::{json, Value};
use std::rc::Rc;

/// Ambient listener registrations, released on drop.
///
/// Registrations are recorded as they are made, so whatever was installed is
/// removed again however the guard goes away: explicit [`release`], a normal
/// drop, unwinding, or a panic part-way through [`install`].
///
/// [`release`]: AmbientListeners::release
/// [`install`]: AmbientListeners::install
pub struct AmbientListeners {
    env: Rc<dyn Environment>,
    registrations: Vec<(AmbientEvent, ListenerId)>,
}

impl AmbientListeners {
    /// Subscribe each of `events` so that it appends to `log`.
    ///
    /// Clicks and scrolls go through the built-in `trackClick` and
    /// `trackScroll` trackers; the other events are logged directly.
    pub fn install(env: Rc<dyn Environment>, log: &EventLog, events: &[AmbientEvent]) -> Self {
        let mut guard = AmbientListeners {
            env: Rc::clone(&env),
            registrations: Vec::with_capacity(events.len()),
        };
        for &event in events {
            if guard.registrations.iter().any(|(e, _)| *e == event) {
                continue;
            }
            let handler = handler_for(Rc::clone(&env), log.clone());
            let id = env.add_listener(event, handler);
            guard.registrations.push((event, id));
            log::debug!("activity-tracker: listening for '{event}'");
        }
        guard
    }

    /// Events currently subscribed.
    pub fn events(&self) -> impl Iterator<Item = AmbientEvent> + '_ {
        self.registrations.iter().map(|(e, _)| *e)
    }

    /// Remove every registration now.
    pub fn release(mut self) {
        self.remove_all();
    }

    fn remove_all(&mut self) {
        for (event, id) in self.registrations.drain(..) {
            if !self.env.remove_listener(event, id) {
                log::warn!("activity-tracker: '{event}' listener was already removed");
            }
        }
    }
}

impl Drop for AmbientListeners {
    fn drop(&mut self) {
        if !self.registrations.is_empty() {
            log::debug!(
                "activity-tracker: removing {} ambient listeners",
                self.registrations.len()
            );
            self.remove_all();
        }
    }
}

impl std::fmt::Debug for AmbientListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbientListeners")
            .field("registrations", &self.registrations)
            .finish()
    }
}

fn details(value: Value) -> Details {
    match value {
        Value::Object(map) => map,
        _ => Details::new(),
    }
}

/// Whole-pixel coordinates as integers, the way a browser reports `clientX`.
fn pixel(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < 9.0e15 {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}

fn record_builtin(name: &str, env: &dyn Environment, log: &EventLog, payload: Details) {
    if let Some(tracker) = find_builtin(name) {
        tracker.record(env, log, payload);
    }
}

// Handlers hold the environment weakly; the environment owns the handlers.
fn handler_for(env: Rc<dyn Environment>, log: EventLog) -> Handler {
    let env = Rc::downgrade(&env);
    Rc::new(move |signal: &AmbientSignal| {
        let Some(env) = env.upgrade() else {
            return;
        };
        match signal {
            AmbientSignal::Click { client_x, client_y } => record_builtin(
                "trackClick",
                env.as_ref(),
                &log,
                details(json!({"x": pixel(*client_x), "y": pixel(*client_y)})),
            ),
            AmbientSignal::Scroll => {
                record_builtin("trackScroll", env.as_ref(), &log, Details::new())
            }
            AmbientSignal::PageShow => {
                log.append(
                    "page_show",
                    details(json!({"timestamp": iso_timestamp(Utc::now())})),
                );
            }
            AmbientSignal::PageHide => {
                log.append(
                    "page_hide",
                    details(json!({"timestamp": iso_timestamp(Utc::now())})),
                );
            }
            AmbientSignal::Error { message, stack } => {
                log.append("error", details(json!({"message": message, "stack": stack})));
            }
            AmbientSignal::UnhandledRejection { reason } => {
                log.append("unhandledrejection", details(json!({"reason": reason})));
            }
        }
    })
}
