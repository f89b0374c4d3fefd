//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Control path and lifecycle produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - The signal fast path emits neither logs nor metrics
//! - Metrics are recorded through the `metrics` facade and are no-ops
//!   unless the exporter is installed

pub mod logging;
pub mod metrics;
