//! Concrete path resolution.
//!
//! # Responsibilities
//! - Walk the frozen trie with the literal tokens of a request path
//! - Collect the identifier tokens in between as parent ids
//! - Decide whether the path names an item or a collection
//!
//! # Design Decisions
//! - Tokens alternate literal / identifier, starting with a literal
//! - One pass, exact child lookup, no backtracking
//! - As many identifiers as literals means the last identifier is the item id;
//!   fewer means the path names a collection. Patterns with compound literal
//!   groups (`a/*/b/c`) cannot be reached by this rule and are left as registered.

use std::fmt;

use crate::resource::ResourceHandler;
use crate::routing::registry::Registry;

/// Outcome of resolving one request path.
#[derive(Clone, Default)]
pub struct MatchResult<'r> {
    handler: Option<&'r dyn ResourceHandler>,
    parent_ids: Vec<String>,
    leaf_id: Option<String>,
}

impl<'r> MatchResult<'r> {
    /// A result with no handler.
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> Option<&'r dyn ResourceHandler> {
        self.handler
    }

    pub fn is_found(&self) -> bool {
        self.handler.is_some()
    }

    /// Ancestor ids, outer to inner.
    pub fn parent_ids(&self) -> &[String] {
        &self.parent_ids
    }

    /// Item id, absent when the path names a collection.
    pub fn leaf_id(&self) -> Option<&str> {
        self.leaf_id.as_deref()
    }
}

impl PartialEq for MatchResult<'_> {
    fn eq(&self, other: &Self) -> bool {
        let same_handler = match (self.handler, other.handler) {
            (Some(a), Some(b)) => std::ptr::addr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_handler && self.parent_ids == other.parent_ids && self.leaf_id == other.leaf_id
    }
}

impl fmt::Debug for MatchResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("found", &self.is_found())
            .field("parent_ids", &self.parent_ids)
            .field("leaf_id", &self.leaf_id)
            .finish()
    }
}

/// Split a path into tokens; a single trailing slash is ignored.
fn tokens(path: &str) -> impl Iterator<Item = &str> {
    path.strip_suffix('/').unwrap_or(path).split('/')
}

impl Registry {
    /// Resolve a request path (relative to the API prefix) to a handler.
    pub fn resolve(&self, path: &str) -> MatchResult<'_> {
        if path.is_empty() {
            return MatchResult::not_found();
        }

        let mut node = self.root();
        let mut literals = 0usize;
        let mut ids = Vec::new();

        for (position, token) in tokens(path).enumerate() {
            if position % 2 == 0 {
                literals += 1;
                node = match node.child(token) {
                    Some(child) => child,
                    None => {
                        tracing::trace!(path = %path, segment = %token, "No resource for segment");
                        return MatchResult::not_found();
                    }
                };
            } else if token.is_empty() {
                tracing::trace!(path = %path, "Empty identifier segment");
                return MatchResult::not_found();
            } else {
                ids.push(token.to_string());
            }
        }

        let handler = match node.handler() {
            Some(handler) => handler,
            None => return MatchResult::not_found(),
        };

        let leaf_id = if literals == ids.len() { ids.pop() } else { None };
        MatchResult {
            handler: Some(handler),
            parent_ids: ids,
            leaf_id,
        }
    }
}
