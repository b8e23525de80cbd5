//! Verb dispatch.
//!
//! # Data Flow
//! ```text
//! (method, leaf id)
//!     → select_operation (pure table, 400/405 decided here)
//!     → invoke the chosen capability with resolved ids, body, query
//!     → non-200 without error becomes a protocol error
//! ```
//!
//! # Design Decisions
//! - Stateless: every request starts from (method, leaf id)
//! - The dispatcher never looks inside a handler
//! - Handler results are passed through verbatim, never retried

use std::fmt;

use hyper::{Method, StatusCode};

use crate::error::RestError;
use crate::resource::{HandlerResult, Payload, QueryParameters};
use crate::routing::MatchResult;

/// Handler capability selected for a request. Item operations carry the item id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation<'a> {
    Options,
    Post,
    Get(&'a str),
    GetMany,
    Put(&'a str),
    Delete(&'a str),
}

impl Operation<'_> {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Options => "options",
            Operation::Post => "post",
            Operation::Get(_) => "get",
            Operation::GetMany => "get_many",
            Operation::Put(_) => "put",
            Operation::Delete(_) => "delete",
        }
    }
}

impl fmt::Display for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a method and the item id, if any, onto a capability.
pub fn select_operation<'a>(
    method: &Method,
    leaf_id: Option<&'a str>,
) -> Result<Operation<'a>, RestError> {
    match (method, leaf_id) {
        (&Method::OPTIONS, _) => Ok(Operation::Options),
        (&Method::POST, Some(_)) => Err(RestError::BadRequest(
            "POST requests must not provide an ID".into(),
        )),
        (&Method::POST, None) => Ok(Operation::Post),
        (&Method::GET, Some(id)) => Ok(Operation::Get(id)),
        (&Method::GET, None) => Ok(Operation::GetMany),
        (&Method::PUT, Some(id)) => Ok(Operation::Put(id)),
        (&Method::PUT, None) => Err(RestError::BadRequest("PUT method must provide an ID".into())),
        (&Method::DELETE, Some(id)) => Ok(Operation::Delete(id)),
        (&Method::DELETE, None) => Err(RestError::BadRequest(
            "DELETE method must provide an ID".into(),
        )),
        _ => Err(RestError::MethodNotAllowed),
    }
}

/// Turn a bare non-200 status into an error.
pub fn into_outcome(result: HandlerResult) -> HandlerResult {
    match result {
        Ok(reply) if reply.status != StatusCode::OK => Err(RestError::from_status(reply.status)),
        other => other,
    }
}

/// Invoke the capability selected by `method` on the matched handler.
///
/// `Ok` always carries a 200 reply.
pub fn dispatch(
    method: &Method,
    matched: &MatchResult<'_>,
    body: Payload,
    query: &QueryParameters,
) -> HandlerResult {
    let handler = matched.handler().ok_or(RestError::NotFound)?;
    let parent_ids = matched.parent_ids();
    let leaf_id = matched.leaf_id();

    let operation = select_operation(method, leaf_id)?;
    tracing::trace!(operation = %operation, parents = ?parent_ids, id = ?leaf_id, "Dispatching");

    let result = match operation {
        Operation::Options => handler.options(),
        Operation::Post => handler.post(parent_ids, body),
        Operation::GetMany => handler.get_many(parent_ids, query),
        Operation::Get(id) => handler.get(id, parent_ids),
        Operation::Put(id) => handler.put(id, parent_ids, body),
        Operation::Delete(id) => handler.delete(id, parent_ids),
    };
    into_outcome(result)
}
