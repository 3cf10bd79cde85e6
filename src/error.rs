use std::io;
use thiserror::Error;

/// Failures the session core surfaces to its caller. A `revert` mid-sequence
/// is a recognized control state handled by the driver, not an error.
#[derive(Debug, Error)]
pub enum DebugError {
    /// The tracker could not read a reported source path. Not retried;
    /// breakpoint verification and stack rendering depend on the caller
    /// noticing this.
    #[error("cannot read source file {path}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A backend message was missing an expected field or carried an unknown
    /// type tag.
    #[error("malformed backend message: {0}")]
    BackendProtocol(String),

    /// Writing a command to the backend process failed.
    #[error("backend transport error")]
    Transport(#[source] io::Error),
}
