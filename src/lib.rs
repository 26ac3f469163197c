mod ambient;
pub mod catalog;
pub mod env;
mod error;
mod event;
mod log;
mod tracker;
mod view;

pub use ambient::AmbientListeners;
pub use catalog::{
    builtin_trackers, merge_details, BuiltinTracker, Catalog, Defaults, LogActivityFn, TrackerFn,
    LOG_ACTIVITY,
};
pub use env::{AmbientEvent, AmbientSignal, Environment, Handler, ListenerId, MemoryEnvironment};
pub use error::TrackerError;
pub use event::{iso_timestamp, ActivityRecord, Details, IntoDetails};
pub use log::{EventLog, ObserverId};
pub use tracker::{ActivityTracker, Provider, ProviderBuilder};
pub use view::{ReduceFn, View};
