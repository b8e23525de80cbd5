//! Bare hyper engine.
//!
//! Accept loop plus one HTTP/1.1 connection task per client. The per-request
//! service is the same tower-http trace layer the axum engine uses, wrapped
//! around [`RestApi::serve`].

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::http::api::{RestApi, RestResponse};

/// Convert a core response into a hyper response.
pub fn into_hyper(response: RestResponse) -> Response<Full<Bytes>> {
    let mut hyper_response = Response::new(Full::new(response.body));
    *hyper_response.status_mut() = response.status;
    *hyper_response.headers_mut() = response.headers;
    hyper_response
}

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not spin the loop.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

async fn back_off_after_accept_error(error: &std::io::Error) {
    tracing::warn!(error = %error, retry_in_ms = ACCEPT_RETRY_DELAY.as_millis() as u64, "Failed to accept connection");
    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
}

pub async fn serve(
    api: Arc<RestApi>,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(connection) => connection,
                Err(e) => {
                    back_off_after_accept_error(&e).await;
                    continue;
                }
            },
            _ = shutdown.recv() => return Ok(()),
        };
        tracing::debug!(peer_addr = %peer, "Connection accepted");

        let api = api.clone();
        tokio::spawn(async move {
            let service = ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .service_fn(move |request: Request<Incoming>| {
                    let api = api.clone();
                    async move { Ok::<_, Infallible>(into_hyper(api.serve(request).await)) }
                });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), TowerToHyperService::new(service))
                .await
            {
                tracing::debug!(peer_addr = %peer, error = %e, "Connection closed with error");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{HeaderMap, HeaderValue};
    use hyper::StatusCode;

    #[test]
    fn test_into_hyper_keeps_everything() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("r1"));
        let response = into_hyper(RestResponse {
            status: StatusCode::BAD_REQUEST,
            headers,
            body: Bytes::from_static(b"nope"),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["x-request-id"], "r1");
    }

    #[tokio::test]
    async fn test_accept_error_backs_off() {
        let started = std::time::Instant::now();
        let error = std::io::Error::from(std::io::ErrorKind::Other);
        back_off_after_accept_error(&error).await;
        assert!(started.elapsed() >= ACCEPT_RETRY_DELAY);
    }
}
