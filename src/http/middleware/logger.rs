//! Request logging.

use hyper::header::{HeaderMap, HeaderName};

use crate::error::HandlerError;
use crate::http::middleware::Middleware;
use crate::http::request::RestRequest;

/// Emits one `info` event per resolved request.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    correlation_header: Option<HeaderName>,
}

impl RequestLogger {
    /// `correlation_header` is logged alongside the request; an invalid name disables it.
    pub fn new(correlation_header: &str) -> Self {
        Self {
            correlation_header: HeaderName::from_bytes(correlation_header.as_bytes()).ok(),
        }
    }
}

impl Middleware for RequestLogger {
    fn handle(&self, request: &RestRequest, _headers: &mut HeaderMap) -> Result<(), HandlerError> {
        let correlation = self
            .correlation_header
            .as_ref()
            .and_then(|name| request.headers.get(name))
            .and_then(|v| v.to_str().ok());

        tracing::info!(
            method = %request.method,
            path = %request.path,
            request_id = request.request_id().unwrap_or("unknown"),
            correlation_id = correlation.unwrap_or("-"),
            "Request"
        );
        Ok(())
    }
}
