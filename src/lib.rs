//! Hierarchical REST resource router.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resource;
pub mod routing;

pub use config::schema::AppConfig;
pub use dispatch::{dispatch, select_operation, Operation};
pub use error::{HandlerError, RegistryError, RestError, ServerError};
pub use http::{EngineKind, HttpServer, RestApi, RestApiBuilder};
pub use lifecycle::Shutdown;
pub use resource::{BaseResource, MemoryResource, Payload, QueryParameters, Reply, ResourceHandler};
pub use routing::{ConflictPolicy, MatchResult, Registry, RegistryBuilder};
