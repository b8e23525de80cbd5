//! Permissive CORS headers.

use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};

use crate::error::HandlerError;
use crate::http::middleware::Middleware;
use crate::http::request::RestRequest;

/// Allows any origin and the verbs the dispatcher understands.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleCors;

impl Middleware for SimpleCors {
    fn handle(&self, _request: &RestRequest, headers: &mut HeaderMap) -> Result<(), HandlerError> {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        // pre-flight
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, GET, OPTIONS, PUT, DELETE"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        Ok(())
    }
}
