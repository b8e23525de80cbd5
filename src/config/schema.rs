//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::http::EngineKind;
use crate::routing::ConflictPolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener, prefix and engine selection.
    pub server: ServerConfig,

    /// Route registry behaviour.
    pub registry: RegistryConfig,

    /// Response headers and request logging.
    pub middleware: MiddlewareConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path prefix all resources live under (e.g., "api/v1").
    pub prefix: String,

    /// HTTP engine serving the API.
    pub engine: EngineKind,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            prefix: "/".to_string(),
            engine: EngineKind::default(),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Route registry configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// What happens when two resources end on the same path.
    pub conflict_policy: ConflictPolicy,
}

/// Middleware configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Add permissive CORS headers to every resource response.
    pub cors: bool,

    /// Log every request that reaches a resource.
    pub request_logging: bool,

    /// Header whose value is attached to request log events.
    pub correlation_header: String,

    /// Static headers added to every resource response.
    pub response_headers: BTreeMap<String, String>,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            cors: false,
            request_logging: true,
            correlation_header: "X-Correlation-Id".to_string(),
            response_headers: BTreeMap::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
