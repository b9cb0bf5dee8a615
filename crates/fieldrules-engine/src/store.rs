//! Rule sources and the immutable, indexed rule set

use fieldrules_core::Result;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::rule::{Rule, RuleConfiguration};

/// Where rule configurations come from
///
/// Called once at engine construction and again on every reload.
pub trait RuleSource: Send + Sync {
    /// Read and parse the current configuration
    fn load(&self) -> Result<RuleConfiguration>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Rule configuration stored in a file, re-read on every load.
///
/// `.yaml` and `.yml` files are parsed as YAML, anything else as JSON.
#[derive(Debug, Clone)]
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    /// Create a source for the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The configured path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_yaml(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
    }
}

impl RuleSource for FileRuleSource {
    fn load(&self) -> Result<RuleConfiguration> {
        let content = std::fs::read_to_string(&self.path)?;
        if self.is_yaml() {
            RuleConfiguration::from_yaml(&content)
        } else {
            RuleConfiguration::from_json(&content)
        }
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// A fixed, in-memory configuration
#[derive(Debug, Clone, Default)]
pub struct StaticRuleSource {
    config: RuleConfiguration,
}

impl StaticRuleSource {
    pub fn new(config: RuleConfiguration) -> Self {
        Self { config }
    }

    /// Parse a JSON document once and serve it on every load
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(RuleConfiguration::from_json(json)?))
    }
}

impl RuleSource for StaticRuleSource {
    fn load(&self) -> Result<RuleConfiguration> {
        Ok(self.config.clone())
    }

    fn describe(&self) -> String {
        format!("static configuration ({} rules)", self.config.rules.len())
    }
}

/// Validated rules, indexed by field and sorted by priority.
///
/// A rule set is never modified after it is built; reloads build a new
/// one and swap it in whole.
#[derive(Debug, Default)]
pub struct RuleSet {
    /// Every rule that survived validation, enabled or not, in load order
    rules: Vec<Arc<Rule>>,

    /// Enabled rules per lowercased field name, ascending priority
    by_field: HashMap<String, Vec<Arc<Rule>>>,

    metadata: Map<String, Value>,
}

impl RuleSet {
    /// A rule set with no rules
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and index a configuration.
    ///
    /// Rules that fail validation are logged and left out. Equal
    /// priorities keep their load order.
    pub fn build(config: RuleConfiguration) -> Self {
        let mut rules = Vec::with_capacity(config.rules.len());
        let mut seen = HashSet::new();

        for definition in config.rules {
            match Rule::try_from(definition) {
                Ok(rule) => {
                    if !seen.insert(rule.id.clone()) {
                        warn!(rule = %rule.id, "Duplicate rule id; metrics will be shared");
                    }
                    rules.push(Arc::new(rule));
                }
                Err(e) => warn!(error = %e, "Skipping invalid rule"),
            }
        }

        let mut by_field: HashMap<String, Vec<Arc<Rule>>> = HashMap::new();
        for rule in rules.iter().filter(|rule| rule.enabled) {
            by_field
                .entry(rule.field_name.to_lowercase())
                .or_default()
                .push(Arc::clone(rule));
        }
        for chain in by_field.values_mut() {
            chain.sort_by_key(|rule| rule.priority);
        }

        debug!(rules = rules.len(), fields = by_field.len(), "Rule set built");

        Self {
            rules,
            by_field,
            metadata: config.metadata,
        }
    }

    /// Load from a source and build
    pub fn load(source: &dyn RuleSource) -> Result<Self> {
        let config = source.load()?;
        let set = Self::build(config);
        info!(source = %source.describe(), rules = set.len(), "Rules loaded");
        Ok(set)
    }

    /// Enabled rules for a field (case-insensitive), lowest priority first
    pub fn rules_for_field(&self, field_name: &str) -> &[Arc<Rule>] {
        self.by_field
            .get(&field_name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All loaded rules, enabled or not
    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Lowercased names of fields with at least one enabled rule
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.by_field.keys().map(String::as_str)
    }

    /// Metadata carried from the configuration document
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

/// Rule counts before and after a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSummary {
    pub previous: usize,
    pub current: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RULES: &str = r#"
{
  "rules": [
    {"id": "late", "fieldName": "Name", "type": "TRANSFORM", "priority": 50, "enabled": true, "action": "TRIM"},
    {"id": "early", "fieldName": "name", "type": "TRANSFORM", "priority": 5, "enabled": true, "action": "UPPERCASE"},
    {"id": "tie", "fieldName": "name", "type": "TRANSFORM", "priority": 50, "enabled": true, "action": "LOWERCASE"},
    {"id": "off", "fieldName": "name", "type": "TRANSFORM", "enabled": false, "action": "REVERSE"},
    {"id": "bad", "fieldName": "name", "type": "SHOUT", "enabled": true, "action": "LOUD"}
  ],
  "metadata": {"owner": "data-team"}
}
"#;

    #[test]
    fn test_build_orders_and_filters() {
        let set = RuleSet::build(RuleConfiguration::from_json(RULES).unwrap());

        // invalid rule dropped, disabled rule kept but not indexed
        assert_eq!(set.len(), 4);
        let ids: Vec<&str> = set.rules_for_field("NAME").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "tie"]);
        assert_eq!(set.fields().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(set.metadata()["owner"], "data-team");
    }

    #[test]
    fn test_unknown_field_is_empty() {
        let set = RuleSet::build(RuleConfiguration::from_json(RULES).unwrap());
        assert!(set.rules_for_field("email").is_empty());
        assert!(RuleSet::empty().is_empty());
    }

    #[test]
    fn test_static_source() {
        let source = StaticRuleSource::from_json(RULES).unwrap();
        let set = RuleSet::load(&source).unwrap();
        assert_eq!(set.len(), 4);
        assert!(source.describe().contains("5 rules"));
    }

    #[test]
    fn test_file_source_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("rules.json");
        std::fs::write(&json_path, RULES).unwrap();
        assert_eq!(RuleSet::load(&FileRuleSource::new(&json_path)).unwrap().len(), 4);

        let yaml_path = dir.path().join("rules.yml");
        let mut file = std::fs::File::create(&yaml_path).unwrap();
        writeln!(
            file,
            "rules:\n  - id: upper\n    fieldName: city\n    type: TRANSFORM\n    enabled: true\n    action: UPPERCASE"
        )
        .unwrap();
        let set = RuleSet::load(&FileRuleSource::new(&yaml_path)).unwrap();
        assert_eq!(set.rules_for_field("city").len(), 1);
    }

    #[test]
    fn test_file_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FileRuleSource::new(dir.path().join("absent.json"));
        assert!(missing.load().is_err());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(FileRuleSource::new(&broken).load().is_err());
    }
}
