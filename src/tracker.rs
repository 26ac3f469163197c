use crate::ambient::AmbientListeners;
use crate::catalog::{Catalog, LogActivityFn, TrackerFn, LOG_ACTIVITY};
use crate::env::{AmbientEvent, Environment};
use crate::error::TrackerError;
use crate::event::{ActivityRecord, Details, IntoDetails};
use crate::log::EventLog;
use std::rc::Rc;

/// Consumer handle: read access to the log plus every tracker.
///
/// Cheap to clone; all clones share one log and one catalog.
#[derive(Clone)]
pub struct ActivityTracker {
    log: EventLog,
    catalog: Rc<Catalog>,
    log_activity: Option<LogActivityFn>,
}

impl std::fmt::Debug for ActivityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityTracker")
            .field("log", &self.log)
            .field("catalog", &self.catalog)
            .field("custom_log_activity", &self.log_activity.is_some())
            .finish()
    }
}

macro_rules! builtin_methods {
    ($($(#[$doc:meta])* $method:ident => $name:literal;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&self, details: impl IntoDetails) {
                self.dispatch($name, details.into_details());
            }
        )*
    };
}

impl ActivityTracker {
    /// The underlying log.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Full history in insertion order.
    pub fn snapshot(&self) -> Vec<ActivityRecord> {
        self.log.snapshot()
    }

    /// Append a record with exactly this type and payload.
    ///
    /// Bypasses the tracker catalog: no defaults are added. If the provider
    /// was built with [`ProviderBuilder::log_activity`], that function is
    /// called instead.
    pub fn log_activity(&self, event_type: &str, details: impl IntoDetails) {
        let details = details.into_details();
        match &self.log_activity {
            Some(custom) => custom(&self.log, event_type, details),
            None => {
                self.log.append(event_type, details);
            }
        }
    }

    /// Call a tracker by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownTracker`] if no tracker has that name.
    pub fn track(&self, name: &str, details: impl IntoDetails) -> Result<(), TrackerError> {
        let tracker = self
            .catalog
            .get(name)
            .ok_or_else(|| TrackerError::UnknownTracker(name.to_string()))?;
        tracker(&self.log, details.into_details());
        Ok(())
    }

    /// The merged tracker catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn dispatch(&self, name: &str, details: Details) {
        match self.catalog.get(name) {
            Some(tracker) => tracker(&self.log, details),
            None => log::warn!("activity-tracker: '{name}' is not in the catalog"),
        }
    }

    builtin_methods! {
        /// `page_view` with the page URL, title and referrer.
        track_page_view => "trackPageView";
        /// `click` with `x`, `y`, `elementId` and `elementClass`.
        track_click => "trackClick";
        /// `scroll` with the scroll offset and percentage scrolled.
        track_scroll => "trackScroll";
        track_product_view => "trackProductView";
        track_add_to_cart => "trackAddToCart";
        track_remove_from_cart => "trackRemoveFromCart";
        track_checkout_step => "trackCheckoutStep";
        track_purchase_complete => "trackPurchaseComplete";
        track_form_submission => "trackFormSubmission";
        track_video_interaction => "trackVideoInteraction";
        track_hover => "trackHover";
        track_session_start => "trackSessionStart";
        track_session_end => "trackSessionEnd";
        track_image_carousel_interaction => "trackImageCarouselInteraction";
        track_time_on_page => "trackTimeOnPage";
        track_search_interaction => "trackSearchInteraction";
        track_tab_switch => "trackTabSwitch";
        track_social_share => "trackSocialShare";
        track_user_feedback => "trackUserFeedback";
    }
}

/// A mounted tracker.
///
/// Owns the log and the ambient listener registrations. Unmounting (or
/// dropping) the provider removes every listener it installed; handles
/// obtained from [`Provider::tracker`] keep working but no longer receive
/// ambient events.
///
/// # Examples
///
/// ```
/// use activity_tracker::{AmbientSignal, MemoryEnvironment, Provider};
/// use serde_json::json;
/// use std::rc::Rc;
///
/// let env = Rc::new(MemoryEnvironment::new("https://shop.test/", "Shop"));
/// let provider = Provider::mount(env.clone());
/// let tracker = provider.tracker();
///
/// tracker.track_click(json!({"x": 50, "y": 75, "elementId": "button1"}));
/// env.dispatch(&AmbientSignal::Scroll);
/// assert_eq!(tracker.snapshot().len(), 2);
///
/// provider.unmount();
/// env.dispatch(&AmbientSignal::Scroll);
/// assert_eq!(tracker.snapshot().len(), 2);
/// ```
#[derive(Debug)]
pub struct Provider {
    tracker: ActivityTracker,
    listeners: AmbientListeners,
}

impl Provider {
    /// Mount with the built-in catalog and all six ambient listeners.
    pub fn mount(env: Rc<dyn Environment>) -> Provider {
        Provider::builder(env).mount()
    }

    /// Create a builder for configuring a provider.
    pub fn builder(env: Rc<dyn Environment>) -> ProviderBuilder {
        ProviderBuilder {
            env,
            custom: Vec::new(),
            log_activity: None,
            ambient: AmbientEvent::ALL.to_vec(),
        }
    }

    /// A handle for consumers.
    pub fn tracker(&self) -> ActivityTracker {
        self.tracker.clone()
    }

    /// The log owned by this provider.
    pub fn log(&self) -> &EventLog {
        &self.tracker.log
    }

    /// Ambient events currently subscribed.
    pub fn ambient_events(&self) -> Vec<AmbientEvent> {
        self.listeners.events().collect()
    }

    /// Tear down, removing every ambient listener.
    pub fn unmount(self) {
        log::debug!(
            "activity-tracker: unmounting with {} records",
            self.tracker.log.len()
        );
        self.listeners.release();
    }
}

/// Builder for configuring and mounting a [`Provider`].
///
/// Obtained via [`Provider::builder`].
pub struct ProviderBuilder {
    env: Rc<dyn Environment>,
    custom: Vec<(String, TrackerFn)>,
    log_activity: Option<LogActivityFn>,
    ambient: Vec<AmbientEvent>,
}

impl ProviderBuilder {
    /// Add a custom tracker. A name that matches a built-in replaces it.
    ///
    /// `"logActivity"` takes an event type as well as details, so it cannot
    /// be replaced here; such an entry is skipped with a warning. Use
    /// [`log_activity`](Self::log_activity) instead.
    pub fn tracker(
        mut self,
        name: impl Into<String>,
        tracker: impl Fn(&EventLog, Details) + 'static,
    ) -> Self {
        self.push_custom(name.into(), Rc::new(tracker));
        self
    }

    /// Replace `logActivity`, the direct-logging entry of the catalog.
    ///
    /// Affects [`ActivityTracker::log_activity`] only. Built-in trackers and
    /// ambient listeners keep appending to the log directly.
    pub fn log_activity(mut self, f: impl Fn(&EventLog, &str, Details) + 'static) -> Self {
        self.log_activity = Some(Rc::new(f));
        self
    }

    /// Add several custom trackers, in order.
    pub fn trackers<I, K>(mut self, trackers: I) -> Self
    where
        I: IntoIterator<Item = (K, TrackerFn)>,
        K: Into<String>,
    {
        for (name, tracker) in trackers {
            self.push_custom(name.into(), tracker);
        }
        self
    }

    fn push_custom(&mut self, name: String, tracker: TrackerFn) {
        if name == LOG_ACTIVITY {
            log::warn!(
                "activity-tracker: '{LOG_ACTIVITY}' cannot be replaced by a tracker; \
                 use ProviderBuilder::log_activity"
            );
            return;
        }
        self.custom.push((name, tracker));
    }

    /// Subscribe only these ambient events instead of all six.
    pub fn ambient_events(mut self, events: &[AmbientEvent]) -> Self {
        self.ambient = events.to_vec();
        self
    }

    /// Allocate the log, install ambient listeners and return the provider.
    pub fn mount(self) -> Provider {
        let catalog = Catalog::builtin(Rc::clone(&self.env)).merge(self.custom);
        let log = EventLog::new();
        let listeners = AmbientListeners::install(Rc::clone(&self.env), &log, &self.ambient);
        log::debug!(
            "activity-tracker: mounted with {} trackers and {} ambient listeners",
            catalog.len(),
            listeners.events().count()
        );
        Provider {
            tracker: ActivityTracker {
                log,
                catalog: Rc::new(catalog),
                log_activity: self.log_activity,
            },
            listeners,
        }
    }
}

impl std::fmt::Debug for ProviderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.custom.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("ProviderBuilder")
            .field("custom", &names)
            .field("custom_log_activity", &self.log_activity.is_some())
            .field("ambient", &self.ambient)
            .finish()
    }
}
