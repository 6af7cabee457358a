use thiserror::Error;

/// Errors raised by pointer-addressed access on a tracked tree.
///
/// Direct operations on [`TrackedObject`](crate::TrackedObject) and
/// [`TrackedArray`](crate::TrackedArray) are total and never return these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackError {
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("path does not point to a tracked composite: {0}")]
    NotComposite(String),
    #[error("invalid array index: {0}")]
    InvalidIndex(String),
    #[error("operation requires a parent, got the root path")]
    RootPath,
}
