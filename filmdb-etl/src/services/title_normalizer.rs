//! Title normalization
//!
//! MovieLens titles carry the release year as a trailing "(YYYY)" suffix,
//! e.g. "Toy Story (1995)". These helpers split it off.

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d{4})\)\s*$").expect("valid year regex"));

static TRAILING_YEAR_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\d{4}\)\s*$").expect("valid suffix regex"));

/// Extract the year from a trailing "(YYYY)" suffix
pub fn extract_embedded_year(title: &str) -> Option<i32> {
    TRAILING_YEAR
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Remove a trailing "(YYYY)" suffix and trim
pub fn strip_embedded_year(title: &str) -> String {
    TRAILING_YEAR_SUFFIX.replace(title, "").trim().to_string()
}
