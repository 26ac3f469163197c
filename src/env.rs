//! The browsing environment the tracker runs in.
//!
//! [`Environment`] supplies ambient page context and the event-listener
//! registry. [`MemoryEnvironment`] is a headless implementation whose page
//! state is set directly and whose events are fired with
//! [`MemoryEnvironment::dispatch`].

use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The six global event sources the tracker instruments automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmbientEvent {
    Click,
    Scroll,
    PageShow,
    PageHide,
    Error,
    UnhandledRejection,
}

impl AmbientEvent {
    /// Every ambient event, in installation order.
    pub const ALL: [AmbientEvent; 6] = [
        AmbientEvent::Click,
        AmbientEvent::Scroll,
        AmbientEvent::PageShow,
        AmbientEvent::PageHide,
        AmbientEvent::Error,
        AmbientEvent::UnhandledRejection,
    ];

    /// The DOM event name.
    pub fn dom_name(self) -> &'static str {
        match self {
            AmbientEvent::Click => "click",
            AmbientEvent::Scroll => "scroll",
            AmbientEvent::PageShow => "pageshow",
            AmbientEvent::PageHide => "pagehide",
            AmbientEvent::Error => "error",
            AmbientEvent::UnhandledRejection => "unhandledrejection",
        }
    }
}

impl fmt::Display for AmbientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_name())
    }
}

/// Payload delivered to an ambient listener.
#[derive(Debug, Clone, PartialEq)]
pub enum AmbientSignal {
    Click { client_x: f64, client_y: f64 },
    Scroll,
    PageShow,
    PageHide,
    /// An uncaught synchronous error.
    Error {
        message: String,
        stack: Option<String>,
    },
    /// A rejected promise nobody handled.
    UnhandledRejection { reason: Value },
}

impl AmbientSignal {
    /// The event source this signal is delivered on.
    pub fn event(&self) -> AmbientEvent {
        match self {
            AmbientSignal::Click { .. } => AmbientEvent::Click,
            AmbientSignal::Scroll => AmbientEvent::Scroll,
            AmbientSignal::PageShow => AmbientEvent::PageShow,
            AmbientSignal::PageHide => AmbientEvent::PageHide,
            AmbientSignal::Error { .. } => AmbientEvent::Error,
            AmbientSignal::UnhandledRejection { .. } => AmbientEvent::UnhandledRejection,
        }
    }
}

/// Identifies one listener registration.
///
/// Ids are unique for the life of the process; [`ListenerId::fresh`] is the
/// only way to obtain one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate an id no other registration has used.
    pub fn fresh() -> ListenerId {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ListenerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A registered ambient listener.
pub type Handler = Rc<dyn Fn(&AmbientSignal)>;

/// Page context and event registry of the hosting environment.
///
/// Methods take `&self`: like the DOM, an environment is shared by everything
/// on the page and mutated through interior mutability.
pub trait Environment {
    /// Current page URL.
    fn location_href(&self) -> String;

    /// Current document title.
    fn document_title(&self) -> String;

    /// URL of the page that linked here, or an empty string.
    fn referrer(&self) -> String;

    /// Vertical scroll offset in pixels.
    fn scroll_y(&self) -> f64;

    /// Height of the document body in pixels.
    fn scroll_height(&self) -> f64;

    /// Register `handler` for `event`.
    fn add_listener(&self, event: AmbientEvent, handler: Handler) -> ListenerId;

    /// Remove a registration. Returns `false` if it was not registered.
    fn remove_listener(&self, event: AmbientEvent, id: ListenerId) -> bool;
}

#[derive(Debug, Clone, Default)]
struct PageState {
    href: String,
    title: String,
    referrer: String,
    scroll_y: f64,
    scroll_height: f64,
}

/// In-memory [`Environment`] for headless hosts, demos and tests.
///
/// # Examples
///
/// ```
/// use activity_tracker::{AmbientEvent, AmbientSignal, Environment, MemoryEnvironment};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let env = MemoryEnvironment::new("https://shop.test/", "Shop");
/// let clicks = Rc::new(Cell::new(0));
/// let seen = Rc::clone(&clicks);
/// let id = env.add_listener(
///     AmbientEvent::Click,
///     Rc::new(move |_: &AmbientSignal| seen.set(seen.get() + 1)),
/// );
///
/// env.dispatch(&AmbientSignal::Click { client_x: 1.0, client_y: 2.0 });
/// assert!(env.remove_listener(AmbientEvent::Click, id));
/// env.dispatch(&AmbientSignal::Click { client_x: 1.0, client_y: 2.0 });
/// assert_eq!(clicks.get(), 1);
/// ```
#[derive(Default)]
pub struct MemoryEnvironment {
    page: RefCell<PageState>,
    listeners: RefCell<Vec<(AmbientEvent, ListenerId, Handler)>>,
}

impl MemoryEnvironment {
    /// Create an environment showing `href` with the given title, scrolled
    /// to the top of an empty document.
    pub fn new(href: &str, title: &str) -> Self {
        let env = MemoryEnvironment::default();
        {
            let mut page = env.page.borrow_mut();
            page.href = href.to_string();
            page.title = title.to_string();
        }
        env
    }

    pub fn set_location(&self, href: &str) {
        self.page.borrow_mut().href = href.to_string();
    }

    pub fn set_title(&self, title: &str) {
        self.page.borrow_mut().title = title.to_string();
    }

    pub fn set_referrer(&self, referrer: &str) {
        self.page.borrow_mut().referrer = referrer.to_string();
    }

    /// Set the scroll offset and the document body height.
    pub fn set_scroll(&self, scroll_y: f64, scroll_height: f64) {
        let mut page = self.page.borrow_mut();
        page.scroll_y = scroll_y;
        page.scroll_height = scroll_height;
    }

    /// Fire `signal` at every listener registered for its event.
    ///
    /// Handlers run in registration order and may add or remove listeners;
    /// such changes take effect from the next dispatch. Returns the number of
    /// handlers invoked.
    pub fn dispatch(&self, signal: &AmbientSignal) -> usize {
        let event = signal.event();
        let handlers: Vec<Handler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(e, _, _)| *e == event)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in &handlers {
            handler(signal);
        }
        handlers.len()
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: AmbientEvent) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(e, _, _)| *e == event)
            .count()
    }

    /// Number of listeners registered across all events.
    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl Environment for MemoryEnvironment {
    fn location_href(&self) -> String {
        self.page.borrow().href.clone()
    }

    fn document_title(&self) -> String {
        self.page.borrow().title.clone()
    }

    fn referrer(&self) -> String {
        self.page.borrow().referrer.clone()
    }

    fn scroll_y(&self) -> f64 {
        self.page.borrow().scroll_y
    }

    fn scroll_height(&self) -> f64 {
        self.page.borrow().scroll_height
    }

    fn add_listener(&self, event: AmbientEvent, handler: Handler) -> ListenerId {
        let id = ListenerId::fresh();
        self.listeners.borrow_mut().push((event, id, handler));
        id
    }

    fn remove_listener(&self, event: AmbientEvent, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(e, lid, _)| !(*e == event && *lid == id));
        listeners.len() != before
    }
}

impl fmt::Debug for MemoryEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEnvironment")
            .field("page", &*self.page.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
