//! Resource router server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ engine (axum | hyper)
//!                         │
//!                         ▼
//!                     RestApi::serve ──▶ strip prefix ──▶ Registry::resolve
//!                                                             │
//!                                                             ▼
//!                                         middleware chain ──▶ dispatch ──▶ ResourceHandler
//!                                                                              │
//!     Client Response                                                          │
//!     ◀────────────── RestResponse ◀── status / error mapping ◀────────────────┘
//! ```
//!
//! The registry is built once at startup and shared read-only by every
//! connection task.

use std::path::PathBuf;

use clap::Parser;

use resource_router::config::load_or_default;
use resource_router::http::{server, EngineKind, HttpServer};
use resource_router::lifecycle::{signals, startup, Shutdown};
use resource_router::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "resource-router", version, about = "Hierarchical REST resource router")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP engine to serve with
    #[arg(short, long, value_enum)]
    engine: Option<EngineKind>,

    /// Listen address, overrides server.bind_address
    #[arg(short, long)]
    bind: Option<String>,

    /// URL prefix, overrides server.prefix
    #[arg(short, long)]
    prefix: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(engine) = cli.engine {
        config.server.engine = engine;
    }
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(prefix) = cli.prefix {
        config.server.prefix = prefix;
    }

    logging::init_logging(&config.observability);

    tracing::info!("resource-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        engine = %config.server.engine,
        prefix = %config.server.prefix,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let api = startup::build_api(&config)?;

    let listener = server::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let http_server = HttpServer::new(api, config.server.engine);
    http_server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
