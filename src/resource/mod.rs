//! Resource handler contract.
//!
//! # Data Flow
//! ```text
//! Verb dispatcher
//!     → one of six capabilities on ResourceHandler
//!     → Reply (status, body) or RestError
//! ```
//!
//! # Design Decisions
//! - Handlers never see the router: they get already-resolved ids only
//! - Every capability has a default; a handler overrides only the verbs it supports
//! - Defaults answer 405 without an error value, so the boundary turns them
//!   into "Method Not Allowed" like any other bare status

pub mod memory;

use std::collections::HashMap;

use bytes::Bytes;
use hyper::StatusCode;

use crate::error::RestError;

pub use memory::MemoryResource;

/// Raw request or response body.
pub type Payload = Bytes;

/// Query string parameters, each name mapped to all of its values.
pub type QueryParameters = HashMap<String, Vec<String>>;

/// Result of a handler capability.
pub type HandlerResult = Result<Reply, RestError>;

/// Status and body returned by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Payload,
}

impl Reply {
    /// 200 with the given body.
    pub fn ok(body: impl Into<Payload>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }

    /// 200 with an empty body.
    pub fn empty() -> Self {
        Self::ok(Payload::new())
    }

    /// A bare status with an empty body.
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: Payload::new(),
        }
    }

    /// Serialize `value` as a JSON 200 reply.
    pub fn json<T: serde::Serialize>(value: &T) -> HandlerResult {
        serde_json::to_vec(value)
            .map(Self::ok)
            .map_err(|e| RestError::handler(StatusCode::INTERNAL_SERVER_ERROR, e))
    }
}

/// The six operations a resource can expose.
///
/// `parent_ids` are ordered outer to inner: for
/// `grandparents/1/parents/2/children/3` a child handler receives `["1", "2"]`
/// and id `"3"`.
pub trait ResourceHandler: Send + Sync {
    fn options(&self) -> HandlerResult {
        Ok(Reply::empty())
    }

    fn post(&self, _parent_ids: &[String], _payload: Payload) -> HandlerResult {
        Ok(Reply::status(StatusCode::METHOD_NOT_ALLOWED))
    }

    fn get(&self, _id: &str, _parent_ids: &[String]) -> HandlerResult {
        Ok(Reply::status(StatusCode::METHOD_NOT_ALLOWED))
    }

    fn get_many(&self, _parent_ids: &[String], _query: &QueryParameters) -> HandlerResult {
        Ok(Reply::status(StatusCode::METHOD_NOT_ALLOWED))
    }

    fn put(&self, _id: &str, _parent_ids: &[String], _payload: Payload) -> HandlerResult {
        Ok(Reply::status(StatusCode::METHOD_NOT_ALLOWED))
    }

    fn delete(&self, _id: &str, _parent_ids: &[String]) -> HandlerResult {
        Ok(Reply::status(StatusCode::METHOD_NOT_ALLOWED))
    }
}

/// Handler that keeps every default: OPTIONS answers 200, everything else 405.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseResource;

impl ResourceHandler for BaseResource {}
