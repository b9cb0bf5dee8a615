//! Rule kinds and their action payloads
//!
//! Every kind carries its own payload shape. Payloads are decoded and
//! validated when a rule set is built, so a rule that reaches an applier
//! always has the keys its kind needs.

use fieldrules_core::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::appliers::format::{translate_date_pattern, CurrencyLocale, NumberPattern};

/// Upper bound on a FULL mask's configured `length`
pub const MAX_MASK_LENGTH: usize = 4096;

/// The six rule kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleKind {
    Categorize,
    Transform,
    Mask,
    Validate,
    Format,
    Replace,
}

impl FromStr for RuleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "CATEGORIZE" => Ok(RuleKind::Categorize),
            "TRANSFORM" => Ok(RuleKind::Transform),
            "MASK" => Ok(RuleKind::Mask),
            "VALIDATE" => Ok(RuleKind::Validate),
            "FORMAT" => Ok(RuleKind::Format),
            "REPLACE" => Ok(RuleKind::Replace),
            other => Err(Error::config(format!("unknown rule type '{}'", other))),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleKind::Categorize => "CATEGORIZE",
            RuleKind::Transform => "TRANSFORM",
            RuleKind::Mask => "MASK",
            RuleKind::Validate => "VALIDATE",
            RuleKind::Format => "FORMAT",
            RuleKind::Replace => "REPLACE",
        };
        f.write_str(s)
    }
}

/// Decoded action of a rule, one variant per kind
#[derive(Debug, Clone)]
pub enum RuleAction {
    /// Replace the value with a fixed label
    Categorize(String),
    Transform(TransformOp),
    Mask(MaskAction),
    Validate(ValidateAction),
    Format(FormatAction),
    Replace(ReplaceAction),
}

impl RuleAction {
    /// Decode the raw `action` payload for the given kind
    pub fn decode(kind: RuleKind, payload: &Value) -> Result<Self> {
        match kind {
            RuleKind::Categorize => match payload {
                Value::String(label) => Ok(RuleAction::Categorize(label.clone())),
                Value::Number(n) => Ok(RuleAction::Categorize(n.to_string())),
                _ => Err(Error::config("CATEGORIZE action must be a string")),
            },
            RuleKind::Transform => match payload {
                Value::String(op) => Ok(RuleAction::Transform(op.parse()?)),
                _ => Err(Error::config("TRANSFORM action must be a string")),
            },
            RuleKind::Mask => {
                let mask: MaskAction = decode_object(kind, payload)?;
                if mask.length.is_some_and(|length| length > MAX_MASK_LENGTH) {
                    return Err(Error::config(format!(
                        "MASK length must be at most {}",
                        MAX_MASK_LENGTH
                    )));
                }
                Ok(RuleAction::Mask(mask))
            }
            RuleKind::Validate => Ok(RuleAction::Validate(decode_object(kind, payload)?)),
            RuleKind::Format => {
                let raw: RawFormatAction = decode_object(kind, payload)?;
                Ok(RuleAction::Format(FormatAction::try_from(raw)?))
            }
            RuleKind::Replace => Ok(RuleAction::Replace(decode_object(kind, payload)?)),
        }
    }

    /// The kind this action belongs to
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleAction::Categorize(_) => RuleKind::Categorize,
            RuleAction::Transform(_) => RuleKind::Transform,
            RuleAction::Mask(_) => RuleKind::Mask,
            RuleAction::Validate(_) => RuleKind::Validate,
            RuleAction::Format(_) => RuleKind::Format,
            RuleAction::Replace(_) => RuleKind::Replace,
        }
    }
}

fn decode_object<T: for<'de> Deserialize<'de>>(kind: RuleKind, payload: &Value) -> Result<T> {
    if !payload.is_object() {
        return Err(Error::config(format!("{} action must be an object", kind)));
    }
    T::deserialize(payload)
        .map_err(|e| Error::config(format!("invalid {} action: {}", kind, e)))
}

/// Case transformations for TRANSFORM rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOp {
    Uppercase,
    Lowercase,
    /// First letter of every whitespace-delimited run upper, the rest lower
    Titlecase,
    Trim,
    Reverse,
}

impl FromStr for TransformOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "UPPERCASE" => Ok(TransformOp::Uppercase),
            "LOWERCASE" => Ok(TransformOp::Lowercase),
            "TITLECASE" => Ok(TransformOp::Titlecase),
            "TRIM" => Ok(TransformOp::Trim),
            "REVERSE" => Ok(TransformOp::Reverse),
            other => Err(Error::config(format!("unknown transform action '{}'", other))),
        }
    }
}

/// Masking strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum MaskType {
    Full,
    Partial,
    Random,
}

impl TryFrom<String> for MaskType {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        match s.to_uppercase().as_str() {
            "FULL" => Ok(MaskType::Full),
            "PARTIAL" => Ok(MaskType::Partial),
            "RANDOM" => Ok(MaskType::Random),
            _ => Err(format!("unknown mask type '{}'", s)),
        }
    }
}

/// MASK payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskAction {
    pub mask_type: MaskType,

    #[serde(default = "default_mask_char")]
    pub mask_char: String,

    /// FULL: number of mask characters, input length when absent
    #[serde(default)]
    pub length: Option<usize>,

    #[serde(default)]
    pub show_first: usize,

    #[serde(default)]
    pub show_last: usize,

    /// PARTIAL: pass non-alphanumeric characters through untouched
    #[serde(default)]
    pub preserve_format: bool,
}

impl MaskAction {
    /// A FULL mask with default settings
    pub fn full() -> Self {
        Self {
            mask_type: MaskType::Full,
            mask_char: default_mask_char(),
            length: None,
            show_first: 0,
            show_last: 0,
            preserve_format: false,
        }
    }
}

/// What a VALIDATE rule does with a value failing its condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum OnInvalid {
    /// Null the field
    Reject,
    /// Substitute `defaultValue`
    Default,
    /// Leave the value alone
    #[default]
    Skip,
}

impl From<String> for OnInvalid {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "REJECT" => OnInvalid::Reject,
            "DEFAULT" => OnInvalid::Default,
            _ => OnInvalid::Skip,
        }
    }
}

/// VALIDATE payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAction {
    #[serde(default)]
    pub on_invalid: OnInvalid,

    #[serde(default)]
    pub default_value: String,

    #[serde(default = "default_error_message")]
    pub error_message: String,
}

/// FORMAT payload, decoded per format type
#[derive(Debug, Clone)]
pub enum FormatAction {
    /// Ten digits substituted into `{0}`..`{9}` of the template
    Phone { pattern: String },
    /// Input and output patterns, already translated to strftime syntax
    Date { input: String, output: String },
    Number(NumberPattern),
    Currency(CurrencyLocale),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFormatAction {
    format_type: String,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    input_format: Option<String>,
    #[serde(default)]
    output_format: Option<String>,
    #[serde(default)]
    locale: Option<String>,
}

impl TryFrom<RawFormatAction> for FormatAction {
    type Error = Error;

    fn try_from(raw: RawFormatAction) -> Result<Self> {
        let missing = |key: &str| Error::config(format!("FORMAT {} requires '{}'", raw.format_type, key));

        match raw.format_type.to_uppercase().as_str() {
            "PHONE" => Ok(FormatAction::Phone {
                pattern: raw.pattern.clone().ok_or_else(|| missing("pattern"))?,
            }),
            "DATE" => {
                let input = raw.input_format.as_deref().ok_or_else(|| missing("inputFormat"))?;
                let output = raw.output_format.as_deref().ok_or_else(|| missing("outputFormat"))?;
                Ok(FormatAction::Date {
                    input: translate_date_pattern(input)?,
                    output: translate_date_pattern(output)?,
                })
            }
            "NUMBER" => {
                let pattern = raw.pattern.as_deref().ok_or_else(|| missing("pattern"))?;
                Ok(FormatAction::Number(NumberPattern::parse(pattern)?))
            }
            "CURRENCY" => Ok(FormatAction::Currency(CurrencyLocale::resolve(
                raw.locale.as_deref().unwrap_or("en-US"),
            ))),
            other => Err(Error::config(format!("unknown format type '{}'", other))),
        }
    }
}

/// REPLACE payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAction {
    /// Replacement text in `regex` syntax.
    ///
    /// The configuration writes group references as `$1` and escapes a
    /// literal `$` as `\$`; both are rewritten on load, so `$1x` means
    /// group 1 followed by `x`. A digit run is one group number.
    #[serde(deserialize_with = "deserialize_replacement")]
    pub replace_with: String,
}

fn deserialize_replacement<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(expand_group_references(&raw))
}

fn expand_group_references(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '$' => match chars.peek() {
                Some(d) if d.is_ascii_digit() => {
                    out.push_str("${");
                    while let Some(&d) = chars.peek() {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        out.push(d);
                        chars.next();
                    }
                    out.push('}');
                }
                // named group, already braced
                Some('{') => out.push('$'),
                _ => out.push_str("$$"),
            },
            other => out.push(other),
        }
    }

    out
}

fn default_mask_char() -> String {
    "*".to_string()
}

fn default_error_message() -> String {
    "Validation failed".to_string()
}
