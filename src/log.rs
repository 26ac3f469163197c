use crate::event::{ActivityRecord, Details};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identifies an observer registered with [`EventLog::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Rc<dyn Fn(&ActivityRecord)>;

struct Inner {
    records: Vec<ActivityRecord>,
    last_instant: Option<DateTime<Utc>>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

/// Ordered, append-only history of activity records.
///
/// `EventLog` is a cheap handle: clones share the same history. It is meant
/// for a single-threaded event loop, so it uses `Rc`/`RefCell` and is neither
/// `Send` nor `Sync`.
///
/// # Examples
///
/// ```
/// use activity_tracker::{Details, EventLog};
///
/// let log = EventLog::new();
/// log.append("custom_event", Details::new());
/// log.append("other_event", Details::new());
///
/// let records = log.snapshot();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].event_type, "custom_event");
/// ```
#[derive(Clone)]
pub struct EventLog {
    inner: Rc<RefCell<Inner>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        EventLog {
            inner: Rc::new(RefCell::new(Inner {
                records: Vec::new(),
                last_instant: None,
                observers: Vec::new(),
                next_observer: 0,
            })),
        }
    }

    /// Append a record and notify observers.
    ///
    /// The record is stamped with the current time; `event_type` and
    /// `details` are stored exactly as given. Timestamps never go backwards
    /// across the log, even if the wall clock does. Returns the index of the
    /// new record.
    pub fn append(&self, event_type: &str, details: Details) -> usize {
        let (index, record, observers) = {
            let mut inner = self.inner.borrow_mut();
            let now = Utc::now();
            let at = match inner.last_instant {
                Some(last) if last > now => last,
                _ => now,
            };
            inner.last_instant = Some(at);

            let record = ActivityRecord::at(event_type, details, at);
            let index = inner.records.len();
            inner.records.push(record.clone());

            let observers: Vec<Observer> =
                inner.observers.iter().map(|(_, o)| Rc::clone(o)).collect();
            (index, record, observers)
        };

        log::trace!(
            "activity-tracker: appended #{index} '{}'",
            record.event_type
        );

        // Borrow released: observers may read or append.
        for observer in observers {
            observer(&record);
        }

        index
    }

    /// Full history in insertion order.
    pub fn snapshot(&self) -> Vec<ActivityRecord> {
        self.inner.borrow().records.clone()
    }

    /// Records at index `offset` and later.
    ///
    /// An offset past the end yields an empty vector.
    pub fn read_from(&self, offset: usize) -> Vec<ActivityRecord> {
        let inner = self.inner.borrow();
        inner.records.get(offset..).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register an observer called with every record appended from now on.
    pub fn subscribe(&self, observer: impl Fn(&ActivityRecord) + 'static) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        let id = ObserverId(inner.next_observer);
        inner.next_observer += 1;
        inner.observers.push((id, Rc::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.observers.len();
        inner.observers.retain(|(oid, _)| *oid != id);
        inner.observers.len() != before
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventLog")
            .field("records", &inner.records.len())
            .field("observers", &inner.observers.len())
            .finish()
    }
}
