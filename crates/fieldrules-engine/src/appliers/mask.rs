//! MASK applier
//!
//! Positions and lengths are counted in characters, not bytes.

use rand::Rng;

use crate::action::{MaskAction, MaskType};

const RANDOM_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Mask a value according to the MASK payload
pub fn apply(action: &MaskAction, value: &str) -> String {
    match action.mask_type {
        MaskType::Full => {
            let length = action.length.unwrap_or_else(|| value.chars().count());
            action.mask_char.repeat(length)
        }
        MaskType::Partial if action.preserve_format => {
            preserving_mask(value, &action.mask_char, action.show_first, action.show_last)
        }
        MaskType::Partial => {
            partial_mask(value, &action.mask_char, action.show_first, action.show_last)
        }
        MaskType::Random => random_mask(value.chars().count()),
    }
}

fn partial_mask(value: &str, mask_char: &str, show_first: usize, show_last: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= show_first.saturating_add(show_last) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    out.extend(&chars[..show_first]);
    out.push_str(&mask_char.repeat(len - show_first - show_last));
    out.extend(&chars[len - show_last..]);
    out
}

/// Mask alphanumerics outside the shown windows, keeping punctuation so
/// `123-45-6789` stays shaped like an SSN.
fn preserving_mask(value: &str, mask_char: &str, show_first: usize, show_last: usize) -> String {
    let len = value.chars().count();
    if len <= show_first.saturating_add(show_last) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        if !c.is_alphanumeric() || i < show_first || i >= len - show_last {
            out.push(c);
        } else {
            out.push_str(mask_char);
        }
    }
    out
}

fn random_mask(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| RANDOM_CHARSET[rng.gen_range(0..RANDOM_CHARSET.len())] as char)
        .collect()
}
