//! Filename normalization for matching
//!
//! Reduces raw media filenames and catalog names to a comparable form.
//! The normalized form is only ever used for scoring, never written to disk.

use once_cell::sync::Lazy;
use regex::Regex;

/// `[...]` or `(...)` annotations: an opener up to the nearest closer of
/// either kind
static ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)[\[(].*?[\])]").unwrap());

/// Dotted version tokens such as `v1.2`
static VERSION_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"v\d+\.\d+").unwrap());

/// Bare decimal tokens such as `1.05`
static DECIMAL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\d+").unwrap());

/// Normalize a filename (without extension) for comparison
///
/// # Rules Applied
/// 1. Remove bracketed/parenthesized annotations
/// 2. Remove `v<digits>.<digits>` version tokens
/// 3. Remove `<digits>.<digits>` decimal tokens
/// 4. Replace `-` and `_` with spaces
/// 5. Trim surrounding whitespace
///
/// Annotations go first so a decimal inside brackets is never matched on
/// its own. The result is a fixed point: normalizing it again changes
/// nothing.
///
/// # Examples
///
/// ```
/// use popmedia_match::services::normalizer::normalize;
///
/// assert_eq!(normalize("Medieval_Madness_v1.2 (US)"), "Medieval Madness");
/// assert_eq!(normalize("Attack from Mars [1995] 2.0"), "Attack from Mars");
/// ```
pub fn normalize(name: &str) -> String {
    let without_annotations = ANNOTATION.replace_all(name, "");
    let without_versions = VERSION_TOKEN.replace_all(&without_annotations, "");
    let without_decimals = DECIMAL_TOKEN.replace_all(&without_versions, "");

    without_decimals
        .replace(['-', '_'], " ")
        .trim()
        .to_string()
}
