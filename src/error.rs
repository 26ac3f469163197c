use thiserror::Error;

/// Errors returned by [`ActivityTracker::track`](crate::ActivityTracker::track).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrackerError {
    /// No tracker with this name is in the catalog.
    #[error("unknown tracker '{0}'")]
    UnknownTracker(String),
}
