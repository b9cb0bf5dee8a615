//! FORMAT applier
//!
//! Parse failures are `Error::Format` internally and are absorbed here:
//! the value comes back unchanged and a warning is logged.

mod date;
mod number;

pub use date::{reformat_date, translate_date_pattern};
pub use number::{CurrencyLocale, NumberPattern};

use fieldrules_core::{Error, Result};
use tracing::warn;

use crate::action::FormatAction;

/// Digits a PHONE value must reduce to
const PHONE_DIGITS: usize = 10;

/// Format a value, returning it unchanged when it cannot be parsed
pub fn apply(action: &FormatAction, value: &str) -> String {
    let formatted = match action {
        FormatAction::Phone { pattern } => return format_phone(value, pattern),
        FormatAction::Date { input, output } => reformat_date(value, input, output),
        FormatAction::Number(pattern) => parse_number(value).map(|n| pattern.format(n)),
        FormatAction::Currency(locale) => parse_number(value).map(|n| locale.format(n)),
    };

    formatted.unwrap_or_else(|e| {
        warn!(value = %value, error = %e, "Failed to format value");
        value.to_string()
    })
}

/// Substitute the ten digits of `value` into `{0}`..`{9}` of `pattern`
fn format_phone(value: &str, pattern: &str) -> String {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != PHONE_DIGITS {
        return value.to_string();
    }

    digits
        .iter()
        .enumerate()
        .fold(pattern.to_string(), |acc, (i, digit)| {
            acc.replace(&format!("{{{}}}", i), &digit.to_string())
        })
}

fn parse_number(value: &str) -> Result<f64> {
    let number: f64 = value
        .trim()
        .parse()
        .map_err(|_| Error::format(format!("'{}' is not a number", value)))?;

    if number.is_finite() {
        Ok(number)
    } else {
        Err(Error::format(format!("'{}' is not a finite number", value)))
    }
}
