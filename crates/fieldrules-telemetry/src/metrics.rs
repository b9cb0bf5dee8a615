//! Per-rule execution metrics

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector for rule executions.
///
/// Cloning yields another handle onto the same counters, so one collector
/// can be shared by an engine and whoever reports on it. Counters are never
/// reset; an engine reload keeps accumulating into the same ids.
#[derive(Clone, Default)]
pub struct RuleMetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    rules: RwLock<HashMap<String, Arc<RuleCounters>>>,
}

#[derive(Default)]
struct RuleCounters {
    executions: AtomicU64,
    total_latency_us: AtomicU64,
}

impl RuleMetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one execution of a rule
    pub fn record(&self, rule_id: &str, elapsed: Duration) {
        let latency_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let counters = self.counters(rule_id);
        counters.executions.fetch_add(1, Ordering::Relaxed);
        counters
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);

        ::metrics::counter!("fieldrules_rule_executions_total", "rule" => rule_id.to_string())
            .increment(1);
        ::metrics::histogram!("fieldrules_rule_latency_us", "rule" => rule_id.to_string())
            .record(latency_us as f64);
    }

    /// Metrics for a single rule id (zeros if it never ran)
    pub fn get(&self, rule_id: &str) -> RuleMetrics {
        let rules = self.inner.rules.read();
        match rules.get(rule_id) {
            Some(counters) => counters.to_metrics(rule_id),
            None => RuleMetrics::empty(rule_id),
        }
    }

    /// Snapshot for the given rule ids.
    ///
    /// Every id appears in the result, including ones that never executed.
    pub fn snapshot<'a, I>(&self, rule_ids: I) -> HashMap<String, RuleMetrics>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let rules = self.inner.rules.read();
        rule_ids
            .into_iter()
            .map(|id| {
                let metrics = match rules.get(id) {
                    Some(counters) => counters.to_metrics(id),
                    None => RuleMetrics::empty(id),
                };
                (id.to_string(), metrics)
            })
            .collect()
    }

    /// Snapshot of every rule id that has been recorded so far
    pub fn snapshot_all(&self) -> HashMap<String, RuleMetrics> {
        let rules = self.inner.rules.read();
        rules
            .iter()
            .map(|(id, counters)| (id.clone(), counters.to_metrics(id)))
            .collect()
    }

    fn counters(&self, rule_id: &str) -> Arc<RuleCounters> {
        if let Some(counters) = self.inner.rules.read().get(rule_id) {
            return Arc::clone(counters);
        }

        let mut rules = self.inner.rules.write();
        Arc::clone(rules.entry(rule_id.to_string()).or_default())
    }
}

impl RuleCounters {
    fn to_metrics(&self, rule_id: &str) -> RuleMetrics {
        RuleMetrics::new(
            rule_id,
            self.executions.load(Ordering::Relaxed),
            self.total_latency_us.load(Ordering::Relaxed),
        )
    }
}

/// Snapshot of one rule's metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetrics {
    pub rule_id: String,
    pub execution_count: u64,
    /// Cumulative time spent in the rule, microseconds
    pub total_execution_time_us: u64,
    /// `total_execution_time_us / execution_count`, 0 when never executed
    pub average_execution_time_us: f64,
}

impl RuleMetrics {
    fn new(rule_id: &str, execution_count: u64, total_execution_time_us: u64) -> Self {
        let average_execution_time_us = if execution_count == 0 {
            0.0
        } else {
            total_execution_time_us as f64 / execution_count as f64
        };

        Self {
            rule_id: rule_id.to_string(),
            execution_count,
            total_execution_time_us,
            average_execution_time_us,
        }
    }

    fn empty(rule_id: &str) -> Self {
        Self::new(rule_id, 0, 0)
    }
}
