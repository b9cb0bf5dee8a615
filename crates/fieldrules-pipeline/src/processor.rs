//! Per-record rule processing

use fieldrules_engine::RuleEngine;
use std::sync::Arc;
use tracing::debug;

use crate::record::Client;

/// Applies the `name` and `age` rules to a client
#[derive(Debug, Clone)]
pub struct ClientRuleProcessor {
    engine: Arc<RuleEngine>,
}

impl ClientRuleProcessor {
    pub fn new(engine: Arc<RuleEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<RuleEngine> {
        &self.engine
    }

    /// Produce the output record.
    ///
    /// `name` is replaced by its rule output, `ageCategory` is the output
    /// of the `age` rules, `id` and the original `age` are carried over.
    pub fn process(&self, client: &Client) -> Client {
        let name = self.engine.apply_rules("name", client.name.as_deref());
        let age_category = self.engine.apply_rules("age", client.age);

        debug!(
            id = client.id,
            name = ?name,
            age_category = ?age_category,
            "Processed client"
        );

        Client {
            id: client.id,
            name,
            age: client.age,
            age_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldrules_engine::StaticRuleSource;

    const RULES: &str = r#"
{
  "rules": [
    {"id": "upper", "fieldName": "name", "type": "TRANSFORM", "priority": 200, "enabled": true,
     "condition": {"operator": "NOT_NULL"}, "action": "UPPERCASE"},
    {"id": "young", "fieldName": "age", "type": "CATEGORIZE", "priority": 100, "enabled": true,
     "condition": {"operator": "<=", "value": 25}, "action": "Young"},
    {"id": "adult", "fieldName": "age", "type": "CATEGORIZE", "priority": 101, "enabled": true,
     "condition": {"operator": "BETWEEN", "min": 26, "max": 40}, "action": "Adult"},
    {"id": "senior", "fieldName": "age", "type": "CATEGORIZE", "priority": 102, "enabled": true,
     "condition": {"operator": ">", "value": 40}, "action": "Senior"}
  ]
}
"#;

    fn processor() -> ClientRuleProcessor {
        let engine = RuleEngine::new(StaticRuleSource::from_json(RULES).unwrap());
        ClientRuleProcessor::new(Arc::new(engine))
    }

    #[test]
    fn test_process_client() {
        let processed = processor().process(&Client::new(1, "John Doe", 30));

        assert_eq!(processed.id, 1);
        assert_eq!(processed.name.as_deref(), Some("JOHN DOE"));
        assert_eq!(processed.age, Some(30));
        assert_eq!(processed.age_category.as_deref(), Some("Adult"));
    }

    #[test]
    fn test_age_bands() {
        let processor = processor();

        let young = processor.process(&Client::new(2, "Jane Smith", 22));
        assert_eq!(young.name.as_deref(), Some("JANE SMITH"));
        assert_eq!(young.age_category.as_deref(), Some("Young"));

        let senior = processor.process(&Client::new(3, "Bob Johnson", 50));
        assert_eq!(senior.age_category.as_deref(), Some("Senior"));
    }

    #[test]
    fn test_null_fields_stay_null() {
        let client = Client {
            id: 4,
            ..Client::default()
        };

        let processed = processor().process(&client);
        assert_eq!(processed.name, None);
        assert_eq!(processed.age_category, None);
    }
}
