//! Rule chain execution
//!
//! Runs a field's rules in priority order, threading each rule's output
//! into the next one:
//! - VALIDATE and REPLACE are applied directly and test their own condition
//! - every other kind is applied only when its condition matches
//! - a MASK that changes the value ends the chain
//! - a VALIDATE that nulls or replaces the value ends the chain
//! - a rule that errors is logged and skipped
//!
//! Every rule that is applied, whether or not it changed anything, has its
//! wall-clock time recorded.

use fieldrules_telemetry::RuleMetricsCollector;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::action::RuleKind;
use crate::appliers;
use crate::rule::Rule;

/// Executes rule chains and records per-rule timings
#[derive(Clone, Default)]
pub struct ChainExecutor {
    metrics: RuleMetricsCollector,
}

impl ChainExecutor {
    /// Create an executor reporting to the given collector
    pub fn new(metrics: RuleMetricsCollector) -> Self {
        Self { metrics }
    }

    /// The collector timings are recorded into
    pub fn metrics(&self) -> &RuleMetricsCollector {
        &self.metrics
    }

    /// Run `rules` over `value`; `None` in or out is a null field
    pub fn execute(&self, rules: &[Arc<Rule>], value: Option<String>) -> Option<String> {
        let mut current = value?;

        for rule in rules {
            let kind = rule.kind();
            let applies_directly = matches!(kind, RuleKind::Validate | RuleKind::Replace);
            if !applies_directly && !rule.matches(&current) {
                continue;
            }

            let started = Instant::now();
            let outcome = appliers::apply(rule, &current);
            let elapsed = started.elapsed();

            let next = match outcome {
                Ok(next) => next,
                Err(e) => {
                    warn!(rule = %rule.id, field = %rule.field_name, error = %e, "Rule failed, skipping");
                    continue;
                }
            };
            self.metrics.record(&rule.id, elapsed);

            let changed = next.as_deref() != Some(current.as_str());
            match (kind, next) {
                (RuleKind::Validate, None) => {
                    debug!(rule = %rule.id, field = %rule.field_name, "Value rejected, stopping chain");
                    return None;
                }
                (RuleKind::Mask | RuleKind::Validate, Some(next)) if changed => {
                    debug!(rule = %rule.id, field = %rule.field_name, kind = %kind, "Value replaced, stopping chain");
                    return Some(next);
                }
                (_, Some(next)) => current = next,
                // only VALIDATE yields no value
                (_, None) => return None,
            }
        }

        Some(current)
    }
}
