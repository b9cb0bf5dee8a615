//! Action appliers, one per rule kind
//!
//! An applier computes the next value of a field from a rule and the
//! current value. Appliers never fail on bad data: unparsable dates or
//! numbers leave the value unchanged. The only error surfaced to the chain
//! is a REPLACE whose condition value does not compile as a pattern.

pub mod format;
pub mod mask;
pub mod transform;

use fieldrules_core::{Error, Result};
use tracing::warn;

use crate::action::{OnInvalid, ReplaceAction, RuleAction, ValidateAction};
use crate::rule::Rule;

/// Apply a rule's action to `value`.
///
/// `Ok(None)` means the field was rejected (VALIDATE with `REJECT`).
/// CATEGORIZE, TRANSFORM, MASK and FORMAT do not test the rule's
/// condition; the chain gates them before calling in. VALIDATE and
/// REPLACE test it themselves.
pub fn apply(rule: &Rule, value: &str) -> Result<Option<String>> {
    match &rule.action {
        RuleAction::Categorize(label) => Ok(Some(label.clone())),
        RuleAction::Transform(op) => Ok(Some(transform::apply(*op, value))),
        RuleAction::Mask(mask) => Ok(Some(mask::apply(mask, value))),
        RuleAction::Validate(validate) => Ok(apply_validate(rule, validate, value)),
        RuleAction::Format(format) => Ok(Some(format::apply(format, value))),
        RuleAction::Replace(replace) => apply_replace(rule, replace, value).map(Some),
    }
}

fn apply_validate(rule: &Rule, action: &ValidateAction, value: &str) -> Option<String> {
    if rule.matches(value) {
        return Some(value.to_string());
    }

    match action.on_invalid {
        OnInvalid::Reject => {
            warn!(rule = %rule.id, value = %value, reason = %action.error_message, "Validation failed");
            None
        }
        OnInvalid::Default => Some(action.default_value.clone()),
        OnInvalid::Skip => Some(value.to_string()),
    }
}

/// Global substitution of the condition's value, used as a regular
/// expression even when the condition's operator is a plain string test.
fn apply_replace(rule: &Rule, action: &ReplaceAction, value: &str) -> Result<String> {
    if !rule.matches(value) {
        return Ok(value.to_string());
    }

    let pattern = rule
        .condition
        .as_ref()
        .and_then(|condition| condition.pattern())
        .ok_or_else(|| {
            Error::rule_evaluation(
                &rule.id,
                &rule.field_name,
                "replacement pattern is missing or does not compile",
            )
        })?;

    Ok(pattern
        .replace_all(value, action.replace_with.as_str())
        .into_owned())
}
