//! axum engine.
//!
//! A single catch-all route hands every request to [`RestApi::serve`]; axum
//! contributes the connection handling and the tower-http trace layer only.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::api::{RestApi, RestResponse};

impl IntoResponse for RestResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Build the axum router for `api`.
pub fn router(api: Arc<RestApi>) -> Router {
    Router::new()
        .route("/", any(rest_handler))
        .route("/{*path}", any(rest_handler))
        .with_state(api)
        .layer(TraceLayer::new_for_http())
}

async fn rest_handler(State(api): State<Arc<RestApi>>, request: Request) -> Response {
    api.serve(request).await.into_response()
}

pub async fn serve(
    api: Arc<RestApi>,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, router(api))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
}
