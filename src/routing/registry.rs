//! Resource registration trie.
//!
//! # Responsibilities
//! - Store resource handlers keyed by the literal groups of their pattern
//! - Apply the duplicate-path policy
//! - Freeze into an immutable [`Registry`] before serving starts
//!
//! # Design Decisions
//! - Registration is the only mutation and happens on [`RegistryBuilder`];
//!   [`Registry`] has no `&mut self` methods, so sharing it via `Arc` needs no locks
//! - Literal groups are trie keys as-is; `parent/child` after a wildcard is one key

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::resource::ResourceHandler;
use crate::routing::pattern::{expand_path, literal_groups};

/// What to do when two registrations end on the same trie node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Last registration wins.
    #[default]
    Replace,
    /// Fail the second registration.
    Reject,
}

/// One trie node.
pub struct RouteNode {
    segment_key: String,
    children: HashMap<String, RouteNode>,
    handler: Option<Arc<dyn ResourceHandler>>,
}

impl RouteNode {
    fn new(segment_key: impl Into<String>) -> Self {
        Self {
            segment_key: segment_key.into(),
            children: HashMap::new(),
            handler: None,
        }
    }

    /// Literal group this node matches (empty for the root).
    pub fn segment_key(&self) -> &str {
        &self.segment_key
    }

    pub fn child(&self, key: &str) -> Option<&RouteNode> {
        self.children.get(key)
    }

    pub fn handler(&self) -> Option<&dyn ResourceHandler> {
        self.handler.as_deref()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    fn count_handlers(&self) -> usize {
        usize::from(self.has_handler())
            + self
                .children
                .values()
                .map(RouteNode::count_handlers)
                .sum::<usize>()
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("segment_key", &self.segment_key)
            .field("has_handler", &self.has_handler())
            .field("children", &self.children)
            .finish()
    }
}

/// Mutable registration phase.
#[derive(Debug)]
pub struct RegistryBuilder {
    root: RouteNode,
    policy: ConflictPolicy,
    patterns: Vec<String>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new(ConflictPolicy::default())
    }
}

impl RegistryBuilder {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            root: RouteNode::new(""),
            policy,
            patterns: Vec::new(),
        }
    }

    /// Register `handler` for `pattern`.
    pub fn register(
        &mut self,
        pattern: &str,
        handler: impl ResourceHandler + 'static,
    ) -> Result<(), RegistryError> {
        self.register_arc(pattern, Arc::new(handler))
    }

    /// Register a shared handler, e.g. one serving several patterns.
    pub fn register_arc(
        &mut self,
        pattern: &str,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), RegistryError> {
        let pattern = pattern.trim_matches('/');
        if pattern.is_empty() {
            return Err(RegistryError::EmptyPattern);
        }
        let groups = literal_groups(pattern);
        if groups.iter().any(|group| group.is_empty()) {
            return Err(RegistryError::InvalidPattern(pattern.to_string()));
        }

        let mut node = &mut self.root;
        for group in groups {
            node = node
                .children
                .entry(group.to_string())
                .or_insert_with(|| RouteNode::new(group));
        }

        if node.handler.is_some() {
            match self.policy {
                ConflictPolicy::Reject => {
                    return Err(RegistryError::Conflict(pattern.to_string()));
                }
                ConflictPolicy::Replace => {
                    tracing::warn!(pattern = %pattern, "Replacing previously registered resource handler");
                }
            }
        } else {
            self.patterns.push(pattern.to_string());
        }
        node.handler = Some(handler);

        let expanded = expand_path(pattern, "{{}}");
        tracing::debug!(
            pattern = %pattern,
            collection = %expanded.collection,
            item = %expanded.item("{{}}"),
            "Resource registered"
        );
        Ok(())
    }

    /// End the registration phase.
    pub fn freeze(self) -> Registry {
        let handlers = self.root.count_handlers();
        tracing::info!(resources = handlers, "Route registry frozen");
        Registry {
            root: self.root,
            patterns: self.patterns,
        }
    }
}

/// Immutable registry, safe to share between concurrent requests.
#[derive(Debug)]
pub struct Registry {
    root: RouteNode,
    patterns: Vec<String>,
}

impl Registry {
    pub fn root(&self) -> &RouteNode {
        &self.root
    }

    /// Registered patterns in first-registration order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
