//! fieldrules Telemetry
//!
//! Metrics for the fieldrules engine.
//!
//! Provides:
//! - Per-rule execution counters and cumulative latency
//! - Export of the same figures through the `metrics` facade

pub mod metrics;

pub use crate::metrics::{RuleMetrics, RuleMetricsCollector};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{RuleMetrics, RuleMetricsCollector};
}
