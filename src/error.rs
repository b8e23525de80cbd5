//! Error taxonomy shared by the resolver, the dispatcher and the engines.
//!
//! Every request ends in exactly one terminal outcome: a 200 reply from a
//! handler, or one of the [`RestError`] variants below. Nothing is retried.

use hyper::StatusCode;
use thiserror::Error;

/// Error type returned by resource handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Reason used when a status code has no standard phrase.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Request-level failures surfaced to the transport boundary.
#[derive(Debug, Error)]
pub enum RestError {
    /// No registered resource matches the path.
    #[error("Not Found")]
    NotFound,

    /// Verb and identifier do not agree (POST with an id, PUT/DELETE without).
    #[error("{0}")]
    BadRequest(String),

    /// Method outside OPTIONS/POST/GET/PUT/DELETE.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Error returned by a handler, with the status it chose.
    #[error("{source}")]
    Handler {
        status: StatusCode,
        source: HandlerError,
    },

    /// Non-200 status produced without an accompanying error.
    #[error("{reason}")]
    Protocol { status: StatusCode, reason: String },
}

impl RestError {
    /// Wrap a handler error together with the status it should be reported with.
    pub fn handler(status: StatusCode, source: impl Into<HandlerError>) -> Self {
        RestError::Handler {
            status,
            source: source.into(),
        }
    }

    /// Synthesize an error from the standard reason phrase of `status`.
    pub fn from_status(status: StatusCode) -> Self {
        RestError::Protocol {
            status,
            reason: status
                .canonical_reason()
                .unwrap_or(UNKNOWN_ERROR)
                .to_string(),
        }
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::NotFound => StatusCode::NOT_FOUND,
            RestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RestError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RestError::Handler { status, .. } => *status,
            RestError::Protocol { status, .. } => *status,
        }
    }
}

/// Failures while registering resources.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("resource pattern must not be empty")]
    EmptyPattern,

    /// A literal group between wildcards is empty (e.g. `a/*//*/b`).
    #[error("resource pattern `{0}` contains an empty segment")]
    InvalidPattern(String),

    /// Another handler already terminates at this path and the policy rejects it.
    #[error("a handler is already registered for `{0}`")]
    Conflict(String),
}

/// Failures while binding or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
