//! Date reformatting
//!
//! Rule files describe dates with pattern letters (`yyyy-MM-dd`,
//! `MM/dd/yyyy HH:mm`). They are translated once, at load time, into
//! chrono strftime strings.

use chrono::format::{parse_and_remainder, Parsed, StrftimeItems};
use chrono::{NaiveDateTime, NaiveTime};
use fieldrules_core::{Error, Result};

/// Translate a pattern-letter date format into a strftime format string
pub fn translate_date_pattern(pattern: &str) -> Result<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' is a literal quote, otherwise copy up to the closing quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            loop {
                match (chars.get(j), chars.get(j + 1)) {
                    (None, _) => {
                        return Err(Error::config(format!(
                            "unterminated quote in date pattern '{}'",
                            pattern
                        )))
                    }
                    (Some('\''), Some('\'')) => {
                        out.push('\'');
                        j += 2;
                    }
                    (Some('\''), _) => break,
                    (Some(&other), _) => {
                        push_literal(&mut out, other);
                        j += 1;
                    }
                }
            }
            i = j + 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let spec = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('D', _) => "%j",
            _ => {
                return Err(Error::config(format!(
                    "unsupported letter '{}' in date pattern '{}'",
                    c, pattern
                )))
            }
        };
        out.push_str(spec);
        i += run;
    }

    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Parse `value` with the `input` format and render it with `output`.
///
/// Both formats must come from [`translate_date_pattern`]. Values without
/// a time of day are taken at midnight. Only a leading match is required;
/// text after the date (a time part, a zone) is ignored.
pub fn reformat_date(value: &str, input: &str, output: &str) -> Result<String> {
    let mut parsed = Parsed::new();
    parse_and_remainder(&mut parsed, value.trim(), StrftimeItems::new(input))
        .map_err(|e| Error::format(format!("'{}' does not match date format: {}", value, e)))?;

    let date = parsed
        .to_naive_date()
        .map_err(|e| Error::format(format!("'{}' is not a complete date: {}", value, e)))?;
    let time = parsed.to_naive_time().unwrap_or(NaiveTime::MIN);

    Ok(NaiveDateTime::new(date, time).format(output).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation() {
        assert_eq!(translate_date_pattern("yyyy-MM-dd").unwrap(), "%Y-%m-%d");
        assert_eq!(translate_date_pattern("MM/dd/yyyy").unwrap(), "%m/%d/%Y");
        assert_eq!(translate_date_pattern("d MMM yy").unwrap(), "%-d %b %y");
        assert_eq!(
            translate_date_pattern("yyyy-MM-dd'T'HH:mm:ss").unwrap(),
            "%Y-%m-%dT%H:%M:%S"
        );
        assert_eq!(translate_date_pattern("h 'o''clock' a").unwrap(), "%-I o'clock %p");
        assert_eq!(translate_date_pattern("dd'' 100%").unwrap(), "%d' 100%%");
    }

    #[test]
    fn test_unsupported_pattern() {
        assert!(translate_date_pattern("yyyy-MM-dd z").is_err());
        assert!(translate_date_pattern("'open").is_err());
    }

    #[test]
    fn test_reformat() {
        let input = translate_date_pattern("yyyy-MM-dd").unwrap();
        let output = translate_date_pattern("EEEE, MMMM d, yyyy").unwrap();
        assert_eq!(
            reformat_date("2000-01-15", &input, &output).unwrap(),
            "Saturday, January 15, 2000"
        );
    }

    #[test]
    fn test_reformat_with_time() {
        let input = translate_date_pattern("dd/MM/yyyy HH:mm").unwrap();
        let output = translate_date_pattern("yyyy-MM-dd'T'HH:mm").unwrap();
        assert_eq!(
            reformat_date("03/02/2021 17:45", &input, &output).unwrap(),
            "2021-02-03T17:45"
        );
    }

    #[test]
    fn test_reformat_ignores_trailing_text() {
        let input = translate_date_pattern("yyyy-MM-dd").unwrap();
        let output = translate_date_pattern("MM/dd/yyyy").unwrap();
        assert_eq!(
            reformat_date("2000-01-15T10:30:00", &input, &output).unwrap(),
            "01/15/2000"
        );
        assert_eq!(reformat_date("2000-01-15 extra", &input, &output).unwrap(), "01/15/2000");
    }

    #[test]
    fn test_reformat_rejects_garbage() {
        let input = translate_date_pattern("yyyy-MM-dd").unwrap();
        assert!(reformat_date("not-a-date", &input, "%d").is_err());
        assert!(reformat_date("2000-02-30", &input, "%d").is_err());
    }
}
