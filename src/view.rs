use crate::event::ActivityRecord;
use crate::log::EventLog;

/// A pure function that folds a record into state.
///
/// Reducers receive owned state and return owned state. They should ignore
/// event types they don't recognise, since any caller can log any type.
///
/// # Examples
///
/// ```
/// use activity_tracker::{ActivityRecord, ReduceFn};
///
/// fn counter(state: u64, _record: &ActivityRecord) -> u64 {
///     state + 1
/// }
///
/// let reducer: ReduceFn<u64> = counter;
/// ```
pub type ReduceFn<S> = fn(S, &ActivityRecord) -> S;

/// A derived view over an [`EventLog`].
///
/// Owns a reducer and the state it has folded so far, plus the index of the
/// next record to consume. Refreshing only processes records appended since
/// the previous refresh.
pub struct View<S> {
    name: String,
    reducer: ReduceFn<S>,
    state: S,
    offset: usize,
}

impl<S: std::fmt::Debug> std::fmt::Debug for View<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<S: Default> View<S> {
    /// Create a view with default state that has consumed nothing yet.
    pub fn new(name: &str, reducer: ReduceFn<S>) -> Self {
        View {
            name: name.to_string(),
            reducer,
            state: S::default(),
            offset: 0,
        }
    }

    /// Fold every record appended since the last refresh.
    pub fn refresh(&mut self, log: &EventLog) -> &S {
        let records = log.read_from(self.offset);
        if !records.is_empty() {
            let mut state = std::mem::take(&mut self.state);
            for record in &records {
                state = (self.reducer)(state, record);
            }
            self.state = state;
            self.offset += records.len();
        }
        &self.state
    }

    /// Discard the folded state and replay the whole log.
    pub fn rebuild(&mut self, log: &EventLog) -> &S {
        self.state = S::default();
        self.offset = 0;
        self.refresh(log)
    }

    /// Current state. No refresh is performed.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Returns the view name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the next record this view will consume.
    pub fn offset(&self) -> usize {
        self.offset
    }
}
