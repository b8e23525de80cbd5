//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     pattern "parents/*/children" + handler
//!     → pattern.rs (split on the wildcard marker)
//!     → registry.rs (walk/create trie nodes, attach handler)
//!     → freeze into an immutable Registry
//!
//! Incoming request path "parents/5/children/7":
//!     → resolver.rs (alternate literal / id tokens, walk trie)
//!     → Return: MatchResult { handler, parent_ids: ["5"], leaf_id: Some("7") }
//! ```
//!
//! # Design Decisions
//! - Registry is owned and frozen, never a process-wide singleton
//! - No regex, no optional segments, no backtracking
//! - Deterministic: same path always resolves to the same result

pub mod pattern;
pub mod registry;
pub mod resolver;

pub use pattern::{expand_path, normalize_prefix, ExpandedPath, WILDCARD};
pub use registry::{ConflictPolicy, Registry, RegistryBuilder, RouteNode};
pub use resolver::MatchResult;
