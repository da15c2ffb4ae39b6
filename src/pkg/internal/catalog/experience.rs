//! Years-of-experience parsing for the free-text `experience` field.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"\d+").expect("valid integer pattern");
    // "2", "2-4", "2 - 4", "2–4", "5+"
    static ref RANGE: Regex =
        Regex::new(r"(\d+)\s*(?:[-–—]\s*\d+|\+)?").expect("valid range pattern");
}

/// Requested years from a query parameter: the first integer token.
pub fn requested_years(input: &str) -> Option<i32> {
    INTEGER
        .find(input)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Lower bound of a stored experience description such as "1-3 years" or
/// "5+ years". `None` when the text carries no number.
pub fn min_years(experience: &str) -> Option<i32> {
    RANGE
        .captures(experience)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
}
