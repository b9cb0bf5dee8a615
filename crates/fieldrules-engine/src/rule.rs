//! Rule definitions and the rule configuration document

use fieldrules_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::action::{RuleAction, RuleKind};
use crate::condition::RuleCondition;

/// A complete rule configuration document
///
/// ```json
/// { "rules": [ ... ], "metadata": { ... } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfiguration {
    /// Rule definitions in load order
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,

    /// Free-form metadata, carried along untouched
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Wire form used while loading, so one malformed entry does not
/// discard the whole document.
#[derive(Deserialize)]
struct RawConfiguration {
    #[serde(default)]
    rules: Vec<Value>,

    #[serde(default)]
    metadata: Map<String, Value>,
}

impl RuleConfiguration {
    /// Load a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfiguration = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    /// Load a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let raw: RawConfiguration = serde_yaml::from_str(yaml)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfiguration) -> Self {
        let rules = raw
            .rules
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(definition) => Some(definition),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed rule entry");
                    None
                }
            })
            .collect();

        Self {
            rules,
            metadata: raw.metadata,
        }
    }
}

/// A rule as written in the configuration, before its action is decoded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    pub id: String,

    pub field_name: String,

    /// Rule kind name, e.g. `MASK`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub priority: i32,

    /// Rules without `enabled: true` are loaded but never run
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<RuleCondition>,

    /// String for CATEGORIZE/TRANSFORM, object for the other kinds
    #[serde(default)]
    pub action: Value,
}

/// A loaded, validated rule. Never mutated after load.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,

    /// Field the rule applies to, as written (matching is case-insensitive)
    pub field_name: String,

    /// Lower runs first
    pub priority: i32,

    pub enabled: bool,

    pub description: Option<String>,

    /// Gate for the rule; a gated rule without one always applies
    pub condition: Option<RuleCondition>,

    pub action: RuleAction,
}

impl Rule {
    /// The rule kind
    pub fn kind(&self) -> RuleKind {
        self.action.kind()
    }

    /// Evaluate the rule's condition, treating a missing condition as a match
    pub fn matches(&self, value: &str) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |condition| condition.evaluate(Some(value)))
    }
}

impl TryFrom<RuleDefinition> for Rule {
    type Error = Error;

    fn try_from(definition: RuleDefinition) -> Result<Self> {
        let context = |e: Error| Error::config(format!("rule '{}': {}", definition.id, e));

        let kind: RuleKind = definition.kind.parse().map_err(context)?;
        let action = RuleAction::decode(kind, &definition.action).map_err(context)?;

        if matches!(kind, RuleKind::Validate | RuleKind::Replace) && definition.condition.is_none() {
            return Err(context(Error::config(format!("{} rules require a condition", kind))));
        }

        Ok(Rule {
            id: definition.id,
            field_name: definition.field_name,
            priority: definition.priority,
            enabled: definition.enabled,
            description: definition.description,
            condition: definition.condition,
            action,
        })
    }
}
