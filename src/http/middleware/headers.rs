//! Static response headers.

use std::collections::BTreeMap;

use hyper::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::HandlerError;
use crate::http::middleware::Middleware;
use crate::http::request::RestRequest;

/// Adds a fixed set of headers to every resource response.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    headers: HeaderMap,
}

impl ResponseHeaders {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Build from configured name/value pairs, skipping entries that are not legal headers.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let mut headers = HeaderMap::with_capacity(map.len());
        for (name, value) in map {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Ignoring invalid response header"),
            }
        }
        Self { headers }
    }
}

impl Middleware for ResponseHeaders {
    fn handle(&self, _request: &RestRequest, headers: &mut HeaderMap) -> Result<(), HandlerError> {
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Payload;
    use hyper::Method;

    #[test]
    fn test_from_map_skips_invalid() {
        let mut map = BTreeMap::new();
        map.insert("Cache-Control".to_string(), "no-store".to_string());
        map.insert("Bad Name".to_string(), "x".to_string());
        let middleware = ResponseHeaders::from_map(&map);

        let request = RestRequest::new(
            Method::GET,
            &"/widgets".parse().unwrap(),
            HeaderMap::new(),
            Payload::new(),
        );
        let mut headers = HeaderMap::new();
        middleware.handle(&request, &mut headers).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["cache-control"], "no-store");
    }
}
