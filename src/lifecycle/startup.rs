//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the REST core from validated configuration
//! - Register the bundled resources
//! - Freeze the registry before any listener accepts traffic
//!
//! # Design Decisions
//! - Fail fast: a registration error aborts startup

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::RegistryError;
use crate::http::{RestApi, RestApiBuilder};
use crate::resource::{MemoryResource, ResourceHandler};

/// Patterns served by the binary, each backed by its own in-memory store.
pub const DEFAULT_RESOURCES: [(&str, &str); 4] = [
    ("widgets", "widget"),
    ("parents", "parent"),
    ("parents/*/children", "child"),
    ("parents/*/children/*/toys", "toy"),
];

/// Build the API described by `config` with the bundled resources registered.
pub fn build_api(config: &AppConfig) -> Result<RestApi, RegistryError> {
    let mut builder = RestApiBuilder::from_config(config);
    for (pattern, name) in DEFAULT_RESOURCES {
        let handler: Arc<dyn ResourceHandler> = Arc::new(MemoryResource::new(name));
        builder.add_shared_resource(pattern, handler)?;
    }
    let api = builder.build();

    for route in api.routes() {
        tracing::info!(route = %route, "Serving resource");
    }
    Ok(api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RestRequest;
    use crate::resource::Payload;
    use hyper::header::HeaderMap;
    use hyper::{Method, StatusCode};

    #[test]
    fn test_build_api_registers_defaults() {
        let api = build_api(&AppConfig::default()).unwrap();
        assert_eq!(api.registry().len(), DEFAULT_RESOURCES.len());

        let uri = "/parents/1/children/2/toys".parse().unwrap();
        let response = api.handle(RestRequest::new(
            Method::GET,
            &uri,
            HeaderMap::new(),
            Payload::new(),
        ));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(&response.body[..], b"[]");
    }
}
