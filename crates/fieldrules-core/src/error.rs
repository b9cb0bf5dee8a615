//! Error types for fieldrules

/// Result type alias using fieldrules' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fieldrules operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rule configuration could not be read or understood
    #[error("configuration error: {0}")]
    Config(String),

    /// A single rule failed while being evaluated against a field
    #[error("rule '{rule_id}' failed on field '{field}': {message}")]
    RuleEvaluation {
        rule_id: String,
        field: String,
        message: String,
    },

    /// Date/number/currency parsing inside a FORMAT rule
    #[error("format error: {0}")]
    Format(String),

    /// Record source/sink errors raised by a host pipeline
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// File IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new rule evaluation error
    pub fn rule_evaluation(
        rule_id: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::RuleEvaluation {
            rule_id: rule_id.into(),
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a new pipeline error
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_evaluation_display() {
        let err = Error::rule_evaluation("mask-ssn", "ssn", "bad pattern");
        assert_eq!(
            err.to_string(),
            "rule 'mask-ssn' failed on field 'ssn': bad pattern"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "rules.json");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
