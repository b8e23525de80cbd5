//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registry, RestApi, engines produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through log events and the response
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
