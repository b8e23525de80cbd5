//! Shared utilities for integration testing.

use std::net::SocketAddr;

use resource_router::config::AppConfig;
use resource_router::http::{EngineKind, HttpServer};
use resource_router::lifecycle::{startup, Shutdown};
use tokio::net::TcpListener;

/// Both engines, for tests that must behave identically on each.
pub const ENGINES: [EngineKind; 2] = [EngineKind::Axum, EngineKind::Hyper];

/// Start the bundled API on an ephemeral port with the given engine.
pub async fn start_server(engine: EngineKind, config: AppConfig) -> (SocketAddr, Shutdown) {
    let api = startup::build_api(&config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(api, engine);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
