//! Request marshaling shared by every engine.
//!
//! # Responsibilities
//! - Read the body under a size limit and a deadline
//! - Parse the query string into name → values
//! - Make sure every request carries an `x-request-id`

use std::time::Duration;

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{HeaderMap, HeaderValue};
use hyper::{Method, StatusCode, Uri};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{HandlerError, RestError};
use crate::resource::{Payload, QueryParameters};

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Engine-independent view of an inbound request.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: Method,
    pub path: String,
    pub query: QueryParameters,
    pub headers: HeaderMap,
    pub body: Payload,
}

impl RestRequest {
    pub fn new(method: Method, uri: &Uri, headers: HeaderMap, body: Payload) -> Self {
        Self {
            method,
            path: uri.path().to_string(),
            query: parse_query(uri.query()),
            headers,
            body,
        }
    }

    /// The request id, if one has been assigned.
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }
}

/// Limits applied while reading a request.
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_body_bytes: usize,
    pub timeout: Duration,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for RequestLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_body_bytes: config.max_body_bytes,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Parse a raw query string; repeated names keep every value in order.
pub fn parse_query(query: Option<&str>) -> QueryParameters {
    let mut params = QueryParameters::new();
    if let Some(query) = query {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }
    params
}

/// Return the request id, generating a UUID v4 one when absent.
pub fn ensure_request_id(headers: &mut HeaderMap) -> HeaderValue {
    if let Some(existing) = headers.get(X_REQUEST_ID) {
        return existing.clone();
    }
    let generated = HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    headers.insert(X_REQUEST_ID, generated.clone());
    generated
}

/// Collect a body, failing with 413 past `limits.max_body_bytes` and 408 past the deadline.
pub async fn read_body<B>(body: B, limits: &RequestLimits) -> Result<Payload, RestError>
where
    B: Body,
    B::Error: Into<HandlerError>,
{
    let collected = Limited::new(body, limits.max_body_bytes).collect();
    match tokio::time::timeout(limits.timeout, collected).await {
        Ok(Ok(collected)) => Ok(collected.to_bytes()),
        Ok(Err(e)) if e.is::<LengthLimitError>() => {
            Err(RestError::from_status(StatusCode::PAYLOAD_TOO_LARGE))
        }
        Ok(Err(e)) => Err(RestError::BadRequest(format!(
            "failed to read request body: {}",
            e
        ))),
        Err(_) => Err(RestError::from_status(StatusCode::REQUEST_TIMEOUT)),
    }
}

/// Body that never produces a frame.
#[cfg(test)]
pub(crate) struct StalledBody;

#[cfg(test)]
impl Body for StalledBody {
    type Data = Payload;
    type Error = std::convert::Infallible;

    fn poll_frame(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Result<hyper::body::Frame<Payload>, Self::Error>>> {
        std::task::Poll::Pending
    }
}
