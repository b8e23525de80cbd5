//! Engine-agnostic REST core.
//!
//! # Responsibilities
//! - Own the frozen route registry and the normalized API prefix
//! - Run resolution, middleware and verb dispatch for one request
//! - Map the terminal outcome onto a status, headers and body
//!
//! # Design Decisions
//! - Engines only marshal wire types into [`RestRequest`] and out of [`RestResponse`]
//! - 200 writes the handler body; any error writes its message as text/plain
//! - 404 carries an empty body

use std::sync::Arc;
use std::time::Instant;

use hyper::body::Body;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use hyper::{Request, StatusCode};

use crate::config::AppConfig;
use crate::dispatch::dispatch;
use crate::error::{HandlerError, RegistryError, RestError};
use crate::http::middleware::{self, Middleware};
use crate::http::request::{ensure_request_id, read_body, RequestLimits, RestRequest, X_REQUEST_ID};
use crate::observability::metrics;
use crate::resource::{Payload, Reply, ResourceHandler};
use crate::routing::{
    expand_path, normalize_prefix, ConflictPolicy, MatchResult, Registry, RegistryBuilder,
};

/// Engine-independent response.
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Payload,
}

impl RestResponse {
    pub fn from_reply(reply: Reply) -> Self {
        Self {
            status: reply.status,
            headers: HeaderMap::new(),
            body: reply.body,
        }
    }

    pub fn from_error(err: &RestError) -> Self {
        let mut headers = HeaderMap::new();
        let body = match err {
            RestError::NotFound => Payload::new(),
            other => {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                Payload::from(other.to_string())
            }
        };
        Self {
            status: err.status(),
            headers,
            body,
        }
    }
}

/// Startup-phase builder; registration ends with [`RestApiBuilder::build`].
pub struct RestApiBuilder {
    prefix: String,
    registry: RegistryBuilder,
    middleware: Vec<Arc<dyn Middleware>>,
    limits: RequestLimits,
}

impl RestApiBuilder {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
            registry: RegistryBuilder::default(),
            middleware: Vec::new(),
            limits: RequestLimits::default(),
        }
    }

    /// Prefix, conflict policy, limits and middleware taken from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.server.prefix)
            .conflict_policy(config.registry.conflict_policy)
            .limits(RequestLimits::from(&config.server))
            .with_middleware(middleware::from_config(&config.middleware))
    }

    /// Replaces the registry, so call before registering resources.
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.registry = RegistryBuilder::new(policy);
        self
    }

    pub fn limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_middleware(mut self, chain: Vec<Arc<dyn Middleware>>) -> Self {
        self.middleware.extend(chain);
        self
    }

    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middleware.push(Arc::new(middleware));
    }

    pub fn add_resource(
        &mut self,
        pattern: &str,
        handler: impl ResourceHandler + 'static,
    ) -> Result<(), RegistryError> {
        self.registry.register(pattern, handler)
    }

    pub fn add_shared_resource(
        &mut self,
        pattern: &str,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), RegistryError> {
        self.registry.register_arc(pattern, handler)
    }

    pub fn build(self) -> RestApi {
        RestApi {
            prefix: self.prefix,
            registry: self.registry.freeze(),
            middleware: self.middleware,
            limits: self.limits,
        }
    }
}

/// Frozen API: registry, prefix and middleware. Share it with `Arc`.
pub struct RestApi {
    prefix: String,
    registry: Registry,
    middleware: Vec<Arc<dyn Middleware>>,
    limits: RequestLimits,
}

impl RestApi {
    pub fn builder(prefix: &str) -> RestApiBuilder {
        RestApiBuilder::new(prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    /// Full item routes of every registered resource, e.g. `/api/parents/{id1}/children/{id2}`.
    pub fn routes(&self) -> Vec<String> {
        self.registry
            .patterns()
            .iter()
            .map(|pattern| format!("{}{}", self.prefix, expand_path(pattern, "{{}}").item("{{}}")))
            .collect()
    }

    /// Read an HTTP request from any engine and handle it.
    ///
    /// The path is resolved before the body is read, so a request for an
    /// unknown resource is answered 404 whatever its body.
    pub async fn serve<B>(&self, request: Request<B>) -> RestResponse
    where
        B: Body,
        B::Error: Into<HandlerError>,
    {
        let start = Instant::now();
        let (mut parts, body) = request.into_parts();
        let matched = self.lookup(parts.uri.path());
        if !matched.is_found() {
            let request = RestRequest::new(parts.method, &parts.uri, parts.headers, Payload::new());
            return self.handle_matched(request, &matched, start);
        }

        match read_body(body, &self.limits).await {
            Ok(body) => {
                let request = RestRequest::new(parts.method, &parts.uri, parts.headers, body);
                self.handle_matched(request, &matched, start)
            }
            Err(err) => {
                tracing::warn!(method = %parts.method, path = %parts.uri.path(), error = %err, "Failed to read request");
                let request_id = ensure_request_id(&mut parts.headers);
                self.finish(
                    parts.method.as_str(),
                    request_id,
                    RestResponse::from_error(&err),
                    start,
                )
            }
        }
    }

    /// Handle an already-read request.
    pub fn handle(&self, request: RestRequest) -> RestResponse {
        let matched = self.lookup(&request.path);
        self.handle_matched(request, &matched, Instant::now())
    }

    fn handle_matched(
        &self,
        mut request: RestRequest,
        matched: &MatchResult<'_>,
        start: Instant,
    ) -> RestResponse {
        let request_id = ensure_request_id(&mut request.headers);
        let response = self.route(&request, matched);
        self.finish(request.method.as_str(), request_id, response, start)
    }

    fn finish(
        &self,
        method: &str,
        request_id: HeaderValue,
        mut response: RestResponse,
        start: Instant,
    ) -> RestResponse {
        response.headers.insert(X_REQUEST_ID, request_id);
        metrics::record_request(method, response.status.as_u16(), start);
        response
    }

    /// Path relative to the prefix; `None` when the request is outside it.
    ///
    /// Any non-empty remainder is a candidate, one-character resource names included.
    fn resource_path<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_prefix(self.prefix.as_str())
            .filter(|rest| !rest.is_empty())
    }

    fn lookup(&self, path: &str) -> MatchResult<'_> {
        match self.resource_path(path) {
            Some(path) => self.registry.resolve(path),
            None => MatchResult::not_found(),
        }
    }

    fn route(&self, request: &RestRequest, matched: &MatchResult<'_>) -> RestResponse {
        if !matched.is_found() {
            tracing::debug!(path = %request.path, "No resource matched");
            metrics::record_not_found();
            return RestResponse::from_error(&RestError::NotFound);
        }

        let mut headers = HeaderMap::new();
        for m in &self.middleware {
            if let Err(e) = m.handle(request, &mut headers) {
                tracing::error!(path = %request.path, error = %e, "Middleware failed");
                let mut response =
                    RestResponse::from_error(&RestError::handler(StatusCode::INTERNAL_SERVER_ERROR, e));
                headers.extend(response.headers);
                response.headers = headers;
                return response;
            }
        }

        let mut response = match dispatch(
            &request.method,
            matched,
            request.body.clone(),
            &request.query,
        ) {
            Ok(reply) => RestResponse::from_reply(reply),
            Err(err) => {
                tracing::debug!(
                    method = %request.method,
                    path = %request.path,
                    status = err.status().as_u16(),
                    error = %err,
                    "Request failed"
                );
                RestResponse::from_error(&err)
            }
        };
        headers.extend(response.headers);
        response.headers = headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::middleware::SimpleCors;
    use crate::resource::{BaseResource, HandlerResult, MemoryResource, QueryParameters};
    use hyper::{Method, Uri};

    fn request(method: Method, uri: &str, body: &str) -> RestRequest {
        let uri: Uri = uri.parse().unwrap();
        RestRequest::new(method, &uri, HeaderMap::new(), Payload::from(body.to_string()))
    }

    fn text(response: &RestResponse) -> &str {
        std::str::from_utf8(&response.body).unwrap()
    }

    fn api(prefix: &str) -> RestApi {
        let mut builder = RestApi::builder(prefix);
        builder.add_resource("widgets", MemoryResource::new("widget")).unwrap();
        builder
            .add_resource("parents/*/children", MemoryResource::new("child"))
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_prefix_is_stripped() {
        let api = api("api/v1");
        assert_eq!(api.prefix(), "/api/v1/");

        let ok = api.handle(request(Method::GET, "/api/v1/widgets", ""));
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(text(&ok), "[]");

        for path in ["/widgets", "/api/v1/", "/api/v1", "/api/v2/widgets"] {
            let response = api.handle(request(Method::GET, path, ""));
            assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", path);
            assert!(response.body.is_empty());
        }
    }

    #[test]
    fn test_crud_round() {
        let api = api("/");
        let created = api.handle(request(Method::POST, "/parents/5/children", r#"{"n":1}"#));
        assert_eq!(created.status, StatusCode::OK);
        assert_eq!(text(&created), r#"{"id":"1"}"#);

        let item = api.handle(request(Method::GET, "/parents/5/children/1", ""));
        assert_eq!(text(&item), r#"{"id":"1","data":{"n":1}}"#);

        let other_parent = api.handle(request(Method::GET, "/parents/6/children/1", ""));
        assert_eq!(other_parent.status, StatusCode::NOT_FOUND);
        assert_eq!(text(&other_parent), "child 1 not found");

        let rejected = api.handle(request(Method::POST, "/parents/5/children/1", "{}"));
        assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
        assert_eq!(text(&rejected), "POST requests must not provide an ID");

        let patch = api.handle(request(Method::PATCH, "/widgets/1", ""));
        assert_eq!(patch.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(text(&patch), "Method not allowed");
    }

    #[test]
    fn test_default_capability_reports_reason_phrase() {
        let mut builder = RestApi::builder("");
        builder.add_resource("readonly", BaseResource).unwrap();
        let api = builder.build();

        let response = api.handle(request(Method::GET, "/readonly", ""));
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(text(&response), "Method Not Allowed");
        assert_eq!(
            response.headers[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );

        let options = api.handle(request(Method::OPTIONS, "/readonly/1", ""));
        assert_eq!(options.status, StatusCode::OK);
        assert!(options.body.is_empty());
    }

    #[test]
    fn test_request_id_echoed() {
        let api = api("/");
        let mut req = request(Method::GET, "/widgets", "");
        req.headers
            .insert(X_REQUEST_ID, HeaderValue::from_static("req-1"));
        let response = api.handle(req);
        assert_eq!(response.headers[X_REQUEST_ID], "req-1");

        let missing = api.handle(request(Method::GET, "/nothing", ""));
        assert!(missing.headers.contains_key(X_REQUEST_ID));
    }

    #[test]
    fn test_middleware_headers_only_on_resolved_requests() {
        let mut builder = RestApi::builder("/");
        builder.add_resource("widgets", BaseResource).unwrap();
        builder.add_middleware(SimpleCors);
        let api = builder.build();

        let resolved = api.handle(request(Method::OPTIONS, "/widgets", ""));
        assert_eq!(resolved.headers["access-control-allow-origin"], "*");

        let missing = api.handle(request(Method::OPTIONS, "/gadgets", ""));
        assert!(!missing.headers.contains_key("access-control-allow-origin"));
    }

    #[test]
    fn test_failing_middleware_is_500() {
        struct Deny;
        impl Middleware for Deny {
            fn handle(&self, _: &RestRequest, _: &mut HeaderMap) -> Result<(), HandlerError> {
                Err("denied".into())
            }
        }
        struct Panicky;
        impl ResourceHandler for Panicky {
            fn get_many(&self, _: &[String], _: &QueryParameters) -> HandlerResult {
                unreachable!("middleware must stop the request first")
            }
        }

        let mut builder = RestApi::builder("/");
        builder.add_resource("things", Panicky).unwrap();
        builder.add_middleware(Deny);
        let api = builder.build();

        let response = api.handle(request(Method::GET, "/things", ""));
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(text(&response), "denied");
    }

    #[test]
    fn test_routes_are_listed_with_prefix() {
        let api = api("api");
        assert_eq!(
            api.routes(),
            ["/api/widgets/{id1}", "/api/parents/{id1}/children/{id2}"]
        );
    }

    #[tokio::test]
    async fn test_serve_reads_body() {
        use http_body_util::Full;

        let api = api("/");
        let request = Request::builder()
            .method(Method::POST)
            .uri("/widgets")
            .body(Full::new(Payload::from(r#"{"a":1}"#)))
            .unwrap();
        let response = api.serve(request).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(text(&response), r#"{"id":"1"}"#);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_before_body_is_read() {
        use http_body_util::Full;

        let mut builder = RestApi::builder("/").limits(RequestLimits {
            max_body_bytes: 4,
            ..RequestLimits::default()
        });
        builder.add_resource("widgets", MemoryResource::new("widget")).unwrap();
        let api = builder.build();

        let unknown = Request::builder()
            .method(Method::POST)
            .uri("/unknown/path")
            .body(Full::new(Payload::from("0123456789")))
            .unwrap();
        let response = api.serve(unknown).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(response.headers.contains_key(X_REQUEST_ID));

        let known = Request::builder()
            .method(Method::POST)
            .uri("/widgets")
            .body(Full::new(Payload::from("0123456789")))
            .unwrap();
        let response = api.serve(known).await;
        assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_single_character_resource_is_served() {
        let mut builder = RestApi::builder("/");
        builder.add_resource("a", BaseResource).unwrap();
        let api = builder.build();

        let response = api.handle(request(Method::OPTIONS, "/a", ""));
        assert_eq!(response.status, StatusCode::OK);

        let item = api.handle(request(Method::OPTIONS, "/a/1", ""));
        assert_eq!(item.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stalled_body_times_out_only_on_known_paths() {
        use crate::http::request::StalledBody;
        use std::time::Duration;

        let mut builder = RestApi::builder("/").limits(RequestLimits {
            timeout: Duration::from_millis(10),
            ..RequestLimits::default()
        });
        builder.add_resource("widgets", MemoryResource::new("widget")).unwrap();
        let api = builder.build();

        let stalled = |uri: &str| {
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .body(StalledBody)
                .unwrap()
        };
        let unknown = api.serve(stalled("/unknown/path")).await;
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);

        let known = api.serve(stalled("/widgets")).await;
        assert_eq!(known.status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(text(&known), "Request Timeout");
    }
}
