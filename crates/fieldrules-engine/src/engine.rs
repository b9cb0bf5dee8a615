//! Rule engine facade

use fieldrules_core::{FieldValue, Result};
use fieldrules_telemetry::{RuleMetrics, RuleMetricsCollector};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::executor::ChainExecutor;
use crate::rule::Rule;
use crate::store::{ReloadSummary, RuleSet, RuleSource};

/// Field-level rule engine
///
/// Holds the active rule set behind a lock that is only ever held long
/// enough to clone or replace an `Arc`. Each call to [`apply_rules`]
/// works on the snapshot it started with, so a concurrent reload never
/// exposes a partially built set.
///
/// [`apply_rules`]: RuleEngine::apply_rules
pub struct RuleEngine {
    source: Box<dyn RuleSource>,
    active: RwLock<Arc<RuleSet>>,
    executor: ChainExecutor,
}

impl RuleEngine {
    /// Create an engine and load its initial rules.
    ///
    /// A source that cannot be read leaves the engine in pass-through mode
    /// (no rules) until a reload succeeds.
    pub fn new(source: impl RuleSource + 'static) -> Self {
        Self::with_metrics(source, RuleMetricsCollector::new())
    }

    /// Create an engine that records into an existing collector
    pub fn with_metrics(source: impl RuleSource + 'static, metrics: RuleMetricsCollector) -> Self {
        let rule_set = match RuleSet::load(&source) {
            Ok(set) => set,
            Err(e) => {
                error!(source = %source.describe(), error = %e, "Failed to load rules, continuing with none");
                RuleSet::empty()
            }
        };

        Self {
            source: Box::new(source),
            active: RwLock::new(Arc::new(rule_set)),
            executor: ChainExecutor::new(metrics),
        }
    }

    /// Run the rules configured for `field_name` over `value`.
    ///
    /// Null in gives null out. A field without rules gets the string form
    /// of the value back. `None` is also returned when a VALIDATE rule
    /// rejects the value.
    pub fn apply_rules(&self, field_name: &str, value: impl Into<FieldValue>) -> Option<String> {
        let value = value.into().to_text();
        let rule_set = self.rule_set();
        self.executor
            .execute(rule_set.rules_for_field(field_name), value)
    }

    /// Re-read the source and swap in the new rules.
    ///
    /// On error the current rules stay active.
    pub fn reload_rules(&self) -> Result<ReloadSummary> {
        let next = match RuleSet::load(self.source.as_ref()) {
            Ok(set) => Arc::new(set),
            Err(e) => {
                error!(source = %self.source.describe(), error = %e, "Reload failed, keeping current rules");
                return Err(e);
            }
        };

        let current = next.len();
        let previous = std::mem::replace(&mut *self.active.write(), next);
        let summary = ReloadSummary {
            previous: previous.len(),
            current,
        };

        info!(previous = summary.previous, current = summary.current, "Rules reloaded");
        Ok(summary)
    }

    /// Metrics for every loaded rule, including ones that never ran
    pub fn rule_metrics(&self) -> HashMap<String, RuleMetrics> {
        let rule_set = self.rule_set();
        self.executor
            .metrics()
            .snapshot(rule_set.rules().iter().map(|rule| rule.id.as_str()))
    }

    /// Enabled rules for a field, in execution order
    pub fn rules_for_field(&self, field_name: &str) -> Vec<Arc<Rule>> {
        self.rule_set().rules_for_field(field_name).to_vec()
    }

    /// The currently active rule set
    pub fn rule_set(&self) -> Arc<RuleSet> {
        Arc::clone(&*self.active.read())
    }

    /// The collector rule timings are recorded into
    pub fn metrics(&self) -> &RuleMetricsCollector {
        self.executor.metrics()
    }

    /// Description of the rule source
    pub fn source(&self) -> String {
        self.source.describe()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("source", &self.source.describe())
            .field("rules", &self.active.read().len())
            .finish()
    }
}
