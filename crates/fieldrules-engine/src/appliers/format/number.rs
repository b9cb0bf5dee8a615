//! Decimal patterns and currency rendering

use fieldrules_core::{Error, Result};
use tracing::warn;

/// A compiled decimal pattern such as `#,##0.00`, `0.###` or `#0.0%`.
///
/// Supported: literal prefix/suffix, `0` required digit, `#` optional
/// digit, `,` grouping (size taken from the last separator), `.` decimal
/// point, `%` multiplies by 100. Only the positive subpattern is used;
/// negatives get a leading `-`. Rounding is half-even.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPattern {
    prefix: String,
    suffix: String,
    min_integer_digits: usize,
    min_fraction_digits: usize,
    max_fraction_digits: usize,
    grouping: Option<usize>,
    percent: bool,
}

impl NumberPattern {
    /// Compile a decimal pattern
    pub fn parse(pattern: &str) -> Result<Self> {
        let positive = pattern.split(';').next().unwrap_or_default();
        let is_numeric = |c: char| matches!(c, '0' | '#' | ',' | '.');

        let start = positive
            .find(is_numeric)
            .ok_or_else(|| Error::config(format!("number pattern '{}' has no digits", pattern)))?;
        let end = positive[start..]
            .find(|c: char| !is_numeric(c))
            .map_or(positive.len(), |offset| start + offset);

        let prefix = &positive[..start];
        let body = &positive[start..end];
        let suffix = &positive[end..];

        let (integer, fraction) = match body.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (body, ""),
        };
        if fraction.contains('.') || fraction.contains(',') {
            return Err(Error::config(format!("malformed number pattern '{}'", pattern)));
        }

        let grouping = integer
            .rfind(',')
            .map(|idx| integer.len() - idx - 1)
            .filter(|&size| size > 0);

        Ok(Self {
            prefix: prefix.replace('\'', ""),
            suffix: suffix.replace('\'', ""),
            min_integer_digits: integer.matches('0').count(),
            min_fraction_digits: fraction.matches('0').count(),
            max_fraction_digits: fraction.len(),
            grouping,
            percent: prefix.contains('%') || suffix.contains('%'),
        })
    }

    /// Render a finite number
    pub fn format(&self, number: f64) -> String {
        let number = if self.percent { number * 100.0 } else { number };
        let (negative, integer, fraction) = split_rounded(
            number,
            self.max_fraction_digits,
            self.min_fraction_digits,
        );

        let mut integer = if integer == "0" && self.min_integer_digits == 0 && !fraction.is_empty() {
            String::new()
        } else {
            integer
        };
        while integer.len() < self.min_integer_digits {
            integer.insert(0, '0');
        }

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&group_digits(&integer, self.grouping, ','));
        if !fraction.is_empty() {
            out.push('.');
            out.push_str(&fraction);
        }
        out.push_str(&self.suffix);
        out
    }
}

/// Currency presentation for one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyLocale {
    tag: &'static str,
    symbol: &'static str,
    symbol_first: bool,
    /// Between the amount and a trailing symbol
    spacing: &'static str,
    group_separator: char,
    decimal_separator: char,
    fraction_digits: usize,
}

const NBSP: &str = "\u{a0}";

const LOCALES: &[CurrencyLocale] = &[
    CurrencyLocale::leading("en-US", "$", ',', '.', 2),
    CurrencyLocale::leading("en-CA", "$", ',', '.', 2),
    CurrencyLocale::leading("en-AU", "$", ',', '.', 2),
    CurrencyLocale::leading("en-GB", "£", ',', '.', 2),
    CurrencyLocale::leading("ja-JP", "￥", ',', '.', 0),
    CurrencyLocale::leading("zh-CN", "¥", ',', '.', 2),
    CurrencyLocale::trailing("de-DE", "€", '.', ',', 2),
    CurrencyLocale::trailing("it-IT", "€", '.', ',', 2),
    CurrencyLocale::trailing("fr-FR", "€", '\u{202f}', ',', 2),
];

impl CurrencyLocale {
    const fn leading(
        tag: &'static str,
        symbol: &'static str,
        group_separator: char,
        decimal_separator: char,
        fraction_digits: usize,
    ) -> Self {
        Self {
            tag,
            symbol,
            symbol_first: true,
            spacing: "",
            group_separator,
            decimal_separator,
            fraction_digits,
        }
    }

    const fn trailing(
        tag: &'static str,
        symbol: &'static str,
        group_separator: char,
        decimal_separator: char,
        fraction_digits: usize,
    ) -> Self {
        Self {
            tag,
            symbol,
            symbol_first: false,
            spacing: NBSP,
            group_separator,
            decimal_separator,
            fraction_digits,
        }
    }

    /// Look up a locale by language tag (`en-US`, `de_DE`), falling back
    /// to `en-US`
    pub fn resolve(tag: &str) -> Self {
        let wanted = tag.trim().replace('_', "-");
        match LOCALES.iter().find(|l| l.tag.eq_ignore_ascii_case(&wanted)) {
            Some(locale) => locale.clone(),
            None => {
                warn!(locale = %tag, "Unsupported currency locale, using en-US");
                LOCALES[0].clone()
            }
        }
    }

    /// The language tag this locale was resolved to
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Render a finite amount
    pub fn format(&self, amount: f64) -> String {
        let (negative, integer, fraction) =
            split_rounded(amount, self.fraction_digits, self.fraction_digits);

        let mut number = group_digits(&integer, Some(3), self.group_separator);
        if !fraction.is_empty() {
            number.push(self.decimal_separator);
            number.push_str(&fraction);
        }

        let sign = if negative { "-" } else { "" };
        if self.symbol_first {
            format!("{}{}{}", sign, self.symbol, number)
        } else {
            format!("{}{}{}{}", sign, number, self.spacing, self.symbol)
        }
    }
}

/// Round to `max_fraction` digits and drop trailing zeros down to
/// `min_fraction`. Returns (negative, integer digits, fraction digits);
/// values that round to zero are never negative.
fn split_rounded(number: f64, max_fraction: usize, min_fraction: usize) -> (bool, String, String) {
    let rendered = format!("{:.*}", max_fraction, number.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer.to_string(), fraction.to_string()),
        None => (rendered.clone(), String::new()),
    };

    let mut fraction = fraction;
    while fraction.len() > min_fraction && fraction.ends_with('0') {
        fraction.pop();
    }

    let is_zero = integer.bytes().all(|b| b == b'0') && fraction.bytes().all(|b| b == b'0');
    (number < 0.0 && !is_zero, integer, fraction)
}

fn group_digits(digits: &str, group: Option<usize>, separator: char) -> String {
    let Some(size) = group else {
        return digits.to_string();
    };

    let len = digits.len();
    let mut out = String::with_capacity(len + len / size);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % size == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
