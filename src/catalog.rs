//! Named trackers and the built-in tracker table.

use crate::env::Environment;
use crate::event::Details;
use crate::log::EventLog;
use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::fmt;
use std::rc::Rc;

use self::Defaults::{Fields, PageContext, Passthrough, ScrollPosition};

/// A tracker: turns caller details into one `append` on the log.
///
/// Custom trackers receive the log so they can record through the same
/// entry point as the built-ins.
pub type TrackerFn = Rc<dyn Fn(&EventLog, Details)>;

/// Catalog name of the direct-logging entry point.
pub const LOG_ACTIVITY: &str = "logActivity";

/// Replacement for `logActivity`: receives the event type as well as details.
pub type LogActivityFn = Rc<dyn Fn(&EventLog, &str, Details)>;

/// How a built-in tracker derives its default payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defaults {
    /// Copy these keys off the caller's details; missing keys become `null`.
    Fields(&'static [&'static str]),
    /// No defaults; the caller's details are logged as-is.
    Passthrough,
    /// `url`, `pageTitle` and `referrer` from the environment.
    PageContext,
    /// `scrollY` and `percentageScrolled` from the environment.
    ScrollPosition,
}

/// One row of the built-in tracker table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinTracker {
    pub name: &'static str,
    pub event_type: &'static str,
    pub defaults: Defaults,
}

const fn builtin(
    name: &'static str,
    event_type: &'static str,
    defaults: Defaults,
) -> BuiltinTracker {
    BuiltinTracker {
        name,
        event_type,
        defaults,
    }
}

static BUILTIN_TRACKERS: [BuiltinTracker; 19] = [
    builtin("trackPageView", "page_view", PageContext),
    builtin("trackClick", "click", Fields(&["x", "y", "elementId", "elementClass"])),
    builtin("trackScroll", "scroll", ScrollPosition),
    builtin("trackProductView", "product_view", Passthrough),
    builtin("trackAddToCart", "add_to_cart", Passthrough),
    builtin("trackRemoveFromCart", "remove_from_cart", Passthrough),
    builtin("trackCheckoutStep", "checkout_step", Fields(&["step", "cartItems", "cartTotal"])),
    builtin(
        "trackPurchaseComplete",
        "purchase_complete",
        Fields(&["orderId", "cartItems", "totalAmount"]),
    ),
    builtin(
        "trackFormSubmission",
        "form_submission",
        Fields(&["formId", "formName", "fieldsSubmitted"]),
    ),
    builtin(
        "trackVideoInteraction",
        "video_interaction",
        Fields(&["videoId", "action", "currentTime"]),
    ),
    builtin("trackHover", "hover", Fields(&["elementId", "elementType"])),
    builtin("trackSessionStart", "session_start", Fields(&["userId", "sessionId", "deviceType"])),
    builtin("trackSessionEnd", "session_end", Fields(&["userId", "sessionId", "duration"])),
    builtin(
        "trackImageCarouselInteraction",
        "carousel_interaction",
        Fields(&["carouselId", "action", "itemIndex"]),
    ),
    builtin("trackTimeOnPage", "time_on_page", Fields(&["page", "timeSpent"])),
    builtin(
        "trackSearchInteraction",
        "search_interaction",
        Fields(&["searchTerm", "resultClicked", "resultsCount"]),
    ),
    builtin("trackTabSwitch", "tab_switch", Fields(&["tabId", "previousTabId"])),
    builtin("trackSocialShare", "social_share", Fields(&["platform", "contentId"])),
    builtin(
        "trackUserFeedback",
        "user_feedback",
        Fields(&["feedbackType", "feedbackDetails", "itemId"]),
    ),
];

/// The built-in tracker table, in catalog order.
pub fn builtin_trackers() -> &'static [BuiltinTracker] {
    &BUILTIN_TRACKERS
}

/// Key union of `defaults` and `overrides`; `overrides` wins on collision.
///
/// A colliding key keeps its position from `defaults`.
pub fn merge_details(mut defaults: Details, overrides: Details) -> Details {
    for (key, value) in overrides {
        defaults.insert(key, value);
    }
    defaults
}

/// `scrollY / scrollHeight * 100`, or `null` when the ratio is not finite.
fn percentage_scrolled(scroll_y: f64, scroll_height: f64) -> Value {
    Number::from_f64(scroll_y / scroll_height * 100.0)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn number(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

impl BuiltinTracker {
    /// Build this tracker's payload: defaults first, caller details merged over.
    pub fn details(&self, env: &dyn Environment, details: Details) -> Details {
        let mut defaults = Details::new();
        match self.defaults {
            Fields(keys) => {
                for key in keys {
                    let value = details.get(*key).cloned().unwrap_or(Value::Null);
                    defaults.insert((*key).to_string(), value);
                }
            }
            Passthrough => {}
            PageContext => {
                defaults.insert("url".into(), env.location_href().into());
                defaults.insert("pageTitle".into(), env.document_title().into());
                defaults.insert("referrer".into(), env.referrer().into());
            }
            ScrollPosition => {
                let scroll_y = env.scroll_y();
                defaults.insert("scrollY".into(), number(scroll_y));
                defaults.insert(
                    "percentageScrolled".into(),
                    percentage_scrolled(scroll_y, env.scroll_height()),
                );
            }
        }
        merge_details(defaults, details)
    }

    /// Build the payload and append it to `log`.
    pub fn record(&self, env: &dyn Environment, log: &EventLog, details: Details) {
        let details = self.details(env, details);
        log.append(self.event_type, details);
    }

    fn into_tracker(self, env: Rc<dyn Environment>) -> TrackerFn {
        Rc::new(move |log: &EventLog, details: Details| self.record(env.as_ref(), log, details))
    }
}

/// Look up a built-in tracker by name.
pub fn find_builtin(name: &str) -> Option<&'static BuiltinTracker> {
    BUILTIN_TRACKERS.iter().find(|t| t.name == name)
}

/// Ordered mapping from tracker name to tracker.
#[derive(Clone)]
pub struct Catalog {
    trackers: IndexMap<String, TrackerFn>,
}

impl Catalog {
    /// Every built-in tracker, bound to `env`.
    pub fn builtin(env: Rc<dyn Environment>) -> Self {
        let trackers = BUILTIN_TRACKERS
            .iter()
            .map(|t| (t.name.to_string(), t.into_tracker(Rc::clone(&env))))
            .collect();
        Catalog { trackers }
    }

    /// Merge `custom` into this catalog.
    ///
    /// Custom entries replace existing ones of the same name and keep their
    /// position; new names are appended in the order given.
    pub fn merge<I, K>(mut self, custom: I) -> Self
    where
        I: IntoIterator<Item = (K, TrackerFn)>,
        K: Into<String>,
    {
        for (name, tracker) in custom {
            self.insert(name, tracker);
        }
        self
    }

    /// Insert or replace a tracker. Returns the tracker it replaced.
    pub fn insert(&mut self, name: impl Into<String>, tracker: TrackerFn) -> Option<TrackerFn> {
        self.trackers.insert(name.into(), tracker)
    }

    pub fn get(&self, name: &str) -> Option<&TrackerFn> {
        self.trackers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.trackers.contains_key(name)
    }

    /// Tracker names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trackers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
