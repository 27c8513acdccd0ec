use thiserror::Error;

/// Errors raised while talking to the archive.
///
/// Cloneable so a failed document fetch can be cached on the proxy that
/// issued it and reported again on every later read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The archive answered 404 for this path
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other non-2xx answer
    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// The archive answered 2xx but the body was not the expected JSON
    #[error("Invalid response from {path}: {message}")]
    Decode { path: String, message: String },

    /// The configured host cannot be used as a base URL
    #[error("Invalid archive URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// True when the archive reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound(_))
    }
}

/// Errors raised by entity accessors whose precondition does not hold.
///
/// Reading an absent tag or field is never an error (it yields `None`);
/// these are raised only by accessors that need a value to exist, such as
/// traversals to parents and children.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The backing document could not be fetched
    #[error("{path} is unavailable: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: TransportError,
    },

    /// The document exists but does not carry the field
    #[error("{path} has no field {field}")]
    MissingField { path: String, field: &'static str },

    /// The field is present with an unexpected JSON shape
    #[error("Invalid value for {field} on {path}: expected {expected}")]
    InvalidField {
        path: String,
        field: &'static str,
        expected: &'static str,
    },

    /// `mid_instance` on a series without instances
    #[error("Series {0} has no instances")]
    EmptySeries(String),

    /// Write or traversal request failed in transit
    #[error(transparent)]
    Transport(#[from] TransportError),
}
