//! Per-request middleware run by [`RestApi`](crate::http::RestApi).
//!
//! # Data Flow
//! ```text
//! Resolved request (resource found)
//!     → each Middleware in registration order
//!         → may add response headers
//!         → may fail: request ends with 500 and the error text
//!     → verb dispatch
//! ```
//!
//! # Design Decisions
//! - Runs inside the engine-agnostic core so every engine behaves the same
//! - Only requests that resolved to a resource reach middleware

pub mod cors;
pub mod headers;
pub mod logger;

use std::sync::Arc;

use hyper::header::HeaderMap;

use crate::config::MiddlewareConfig;
use crate::error::HandlerError;
use crate::http::request::RestRequest;

pub use cors::SimpleCors;
pub use headers::ResponseHeaders;
pub use logger::RequestLogger;

/// Hook run before a resolved request is dispatched.
pub trait Middleware: Send + Sync {
    /// Inspect the request and add headers to the eventual response.
    fn handle(&self, request: &RestRequest, headers: &mut HeaderMap) -> Result<(), HandlerError>;
}

/// Build the middleware chain described by `config`.
pub fn from_config(config: &MiddlewareConfig) -> Vec<Arc<dyn Middleware>> {
    let mut chain: Vec<Arc<dyn Middleware>> = Vec::new();
    if config.request_logging {
        chain.push(Arc::new(RequestLogger::new(&config.correlation_header)));
    }
    if config.cors {
        chain.push(Arc::new(SimpleCors));
    }
    if !config.response_headers.is_empty() {
        chain.push(Arc::new(ResponseHeaders::from_map(&config.response_headers)));
    }
    chain
}
