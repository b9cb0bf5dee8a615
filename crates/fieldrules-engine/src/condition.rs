//! Rule conditions and the generic condition evaluator

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::warn;

/// Upper bound on compiled pattern size; keeps hostile configs from
/// building huge automata.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Comparison operator of a rule condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// Matches only a null input (`NULL` / `IS_NULL`)
    IsNull,
    NotNull,
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
    Between,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    /// Unrecognized operator, always evaluates to false
    Unknown(String),
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "NULL" | "IS_NULL" => Operator::IsNull,
            "NOT_NULL" => Operator::NotNull,
            "EQUALS" => Operator::Equals,
            "CONTAINS" => Operator::Contains,
            "STARTS_WITH" => Operator::StartsWith,
            "ENDS_WITH" => Operator::EndsWith,
            "REGEX" => Operator::Regex,
            "BETWEEN" => Operator::Between,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterOrEqual,
            "<" => Operator::LessThan,
            "<=" => Operator::LessOrEqual,
            _ => Operator::Unknown(raw),
        }
    }
}

impl From<&str> for Operator {
    fn from(raw: &str) -> Self {
        Operator::from(raw.to_string())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::IsNull => "IS_NULL",
            Operator::NotNull => "NOT_NULL",
            Operator::Equals => "EQUALS",
            Operator::Contains => "CONTAINS",
            Operator::StartsWith => "STARTS_WITH",
            Operator::EndsWith => "ENDS_WITH",
            Operator::Regex => "REGEX",
            Operator::Between => "BETWEEN",
            Operator::GreaterThan => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessOrEqual => "<=",
            Operator::Unknown(raw) => raw,
        };
        f.write_str(s)
    }
}

/// Condition attached to a rule.
///
/// The reference `value` is kept in its string form: numbers in the
/// configuration (`"value": 25`) become `"25"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    pub operator: Operator,

    #[serde(
        default,
        deserialize_with = "reference_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,

    #[serde(default = "default_true")]
    pub case_sensitive: bool,

    /// Lazily compiled `value` pattern, `None` inside when it does not compile
    #[serde(skip)]
    pattern: OnceLock<Option<Regex>>,
}

impl RuleCondition {
    /// Create a condition with no reference value
    pub fn new(operator: impl Into<Operator>) -> Self {
        Self {
            operator: operator.into(),
            value: None,
            min: None,
            max: None,
            case_sensitive: true,
            pattern: OnceLock::new(),
        }
    }

    /// Set the reference value
    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self.pattern = OnceLock::new();
        self
    }

    /// Set the inclusive BETWEEN bounds
    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Match strings and patterns without regard to case
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self.pattern = OnceLock::new();
        self
    }

    /// Evaluate this condition against an input; `None` is a null input.
    ///
    /// Never fails: unparsable numbers, bad patterns and missing reference
    /// values all evaluate to false.
    pub fn evaluate(&self, input: Option<&str>) -> bool {
        let Some(input) = input else {
            return self.operator == Operator::IsNull;
        };

        match &self.operator {
            Operator::IsNull => false,
            Operator::NotNull => !input.trim().is_empty(),
            Operator::Equals => self.compare_text(input, |a, b| a == b),
            Operator::Contains => self.compare_text(input, |a, b| a.contains(b)),
            Operator::StartsWith => self.compare_text(input, |a, b| a.starts_with(b)),
            Operator::EndsWith => self.compare_text(input, |a, b| a.ends_with(b)),
            Operator::Regex => self.pattern().is_some_and(|re| re.is_match(input)),
            Operator::Between => match (parse_int(input), self.min, self.max) {
                (Some(v), Some(min), Some(max)) => min <= v && v <= max,
                _ => false,
            },
            Operator::GreaterThan => self.compare_int(input, |a, b| a > b),
            Operator::GreaterOrEqual => self.compare_int(input, |a, b| a >= b),
            Operator::LessThan => self.compare_int(input, |a, b| a < b),
            Operator::LessOrEqual => self.compare_int(input, |a, b| a <= b),
            Operator::Unknown(_) => false,
        }
    }

    /// The reference value compiled as a regular expression.
    ///
    /// Compiled once per condition and shared by every caller; `None` when
    /// there is no value or it is not a valid pattern.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern
            .get_or_init(|| {
                let source = self.value.as_deref()?;
                match RegexBuilder::new(source)
                    .case_insensitive(!self.case_sensitive)
                    .size_limit(PATTERN_SIZE_LIMIT)
                    .build()
                {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(pattern = %source, error = %e, "Invalid condition pattern");
                        None
                    }
                }
            })
            .as_ref()
    }

    fn compare_text(&self, input: &str, op: impl Fn(&str, &str) -> bool) -> bool {
        let Some(reference) = self.value.as_deref() else {
            return false;
        };

        if self.case_sensitive {
            op(input, reference)
        } else {
            op(&input.to_uppercase(), &reference.to_uppercase())
        }
    }

    fn compare_int(&self, input: &str, op: impl Fn(i64, i64) -> bool) -> bool {
        match (parse_int(input), self.value.as_deref().and_then(parse_int)) {
            (Some(a), Some(b)) => op(a, b),
            _ => false,
        }
    }
}

fn parse_int(s: &str) -> Option<i64> {
    s.parse().ok()
}

fn default_true() -> bool {
    true
}

/// Accept a string, number or boolean and keep its string form
fn reference_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
