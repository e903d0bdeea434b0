//! Small text helpers shared by the extractors and the numeric cleanup.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DECIMAL_PATTERN: Regex = Regex::new(r"\d+[.,]?\d*").unwrap();
    static ref OPERATOR_PREFIX: Regex = Regex::new(r"^(<=|>=|<|>|=)").unwrap();
}

/// Standalone comparison-operator tokens recognised before a value
pub const COMPARISON_OPERATORS: [&str; 5] = ["<", ">", "=", "<=", ">="];

/// First decimal-number substring of `s`, exactly as written
#[must_use]
pub fn first_decimal(s: &str) -> Option<&str> {
    DECIMAL_PATTERN.find(s).map(|m| m.as_str())
}

/// Parse the first decimal-number substring of `s`, accepting a comma separator
///
/// Returns `None` when `s` holds no digits or the substring does not parse.
#[must_use]
pub fn parse_decimal(s: &str) -> Option<f64> {
    first_decimal(s).and_then(|number| number.replace(',', ".").parse::<f64>().ok())
}

/// Comparison operator glued to the front of a token, e.g. `<` in `<2`
#[must_use]
pub fn operator_prefix(token: &str) -> Option<&str> {
    OPERATOR_PREFIX.find(token).map(|m| m.as_str())
}

/// Whether the string contains at least one ASCII digit
#[must_use]
pub fn has_digit(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
}

/// Byte range of the context window of `radius` characters around `start..end`
#[must_use]
pub fn context_bounds(text: &str, start: usize, end: usize, radius: usize) -> (usize, usize) {
    let lo = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let hi = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);
    (lo, hi)
}

/// Capitalise the first letter of every word and lowercase the rest
///
/// A word starts after any non-alphabetic character, so `anti-tnf` becomes
/// `Anti-Tnf`.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
