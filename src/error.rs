//! Error type shared between drivers and the recording proxies.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the wrapped database API.
///
/// The recording layer never produces errors of its own and never
/// translates the ones it sees; every variant here originates in a
/// driver and is propagated to the caller unchanged. The only thing the
/// proxies do on the error path is commit the telemetry for the failed
/// call before handing the error back.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An error reported by the underlying driver.
    #[error("driver error: {message}")]
    Driver { message: String },

    /// An operation was invoked on a handle the driver considers closed.
    #[error("{object} is closed")]
    Closed { object: &'static str },

    /// A column index outside the current row was addressed.
    #[error("no column at index {index}")]
    InvalidColumn { index: usize },

    /// A parameter index outside the statement's parameter list was addressed.
    #[error("no parameter at index {index}")]
    InvalidParameter { index: usize },

    /// A column value could not be converted to the requested type.
    #[error("cannot read {found} column as {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    /// Shorthand for a [`Error::Driver`] with the given message.
    pub fn driver(message: impl Into<String>) -> Self {
        Error::Driver {
            message: message.into(),
        }
    }
}
