//! HTTP server setup.
//!
//! # Responsibilities
//! - Select the HTTP engine named in configuration
//! - Hand the frozen [`RestApi`] to it behind an `Arc`
//! - Stop accepting when the shutdown coordinator fires

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::error::ServerError;
use crate::http::api::RestApi;
use crate::http::{axum_engine, hyper_engine};

/// Available HTTP engines. All of them produce identical responses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// axum router with a catch-all route.
    #[default]
    #[serde(alias = "a")]
    #[value(alias = "a")]
    Axum,
    /// Bare hyper HTTP/1.1 connections.
    #[serde(alias = "h")]
    #[value(alias = "h")]
    Hyper,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Axum => "axum",
            EngineKind::Hyper => "hyper",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bind the listening socket, naming the address on failure.
pub async fn bind(address: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.to_string(),
            source,
        })
}

/// HTTP server running one engine over a shared [`RestApi`].
pub struct HttpServer {
    api: Arc<RestApi>,
    engine: EngineKind,
}

impl HttpServer {
    pub fn new(api: RestApi, engine: EngineKind) -> Self {
        Self {
            api: Arc::new(api),
            engine,
        }
    }

    pub fn api(&self) -> &Arc<RestApi> {
        &self.api
    }

    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            engine = %self.engine,
            prefix = %self.api.prefix(),
            "HTTP server starting"
        );

        match self.engine {
            EngineKind::Axum => axum_engine::serve(self.api, listener, shutdown).await?,
            EngineKind::Hyper => hyper_engine::serve(self.api, listener, shutdown).await?,
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
