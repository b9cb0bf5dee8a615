//! TRANSFORM applier

use crate::action::TransformOp;

/// Apply a case/whitespace transformation
pub fn apply(op: TransformOp, value: &str) -> String {
    match op {
        TransformOp::Uppercase => value.to_uppercase(),
        TransformOp::Lowercase => value.to_lowercase(),
        TransformOp::Titlecase => title_case(value),
        TransformOp::Trim => value.trim().to_string(),
        TransformOp::Reverse => value.chars().rev().collect(),
    }
}

fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;

    for c in value.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_transforms() {
        assert_eq!(apply(TransformOp::Uppercase, "john doe"), "JOHN DOE");
        assert_eq!(apply(TransformOp::Lowercase, "John DOE"), "john doe");
        assert_eq!(apply(TransformOp::Trim, "  padded \t"), "padded");
        assert_eq!(apply(TransformOp::Reverse, "abc"), "cba");
    }

    #[test]
    fn test_titlecase() {
        assert_eq!(apply(TransformOp::Titlecase, "jOHN  mcDONALD"), "John  Mcdonald");
        assert_eq!(apply(TransformOp::Titlecase, "anne-marie o'neil"), "Anne-marie O'neil");
        assert_eq!(apply(TransformOp::Titlecase, ""), "");
    }
}
