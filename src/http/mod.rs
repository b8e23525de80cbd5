//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (engine selection)
//!     → axum_engine.rs | hyper_engine.rs (wire ↔ RestRequest/RestResponse only)
//!     → request.rs (body limit, deadline, query, request ID)
//!     → api.rs (prefix, resolve, middleware, dispatch, error mapping)
//!     → Send to client
//! ```

pub mod api;
pub mod axum_engine;
pub mod hyper_engine;
pub mod middleware;
pub mod request;
pub mod server;

pub use api::{RestApi, RestApiBuilder, RestResponse};
pub use request::{RequestLimits, RestRequest, X_REQUEST_ID};
pub use server::{EngineKind, HttpServer};
