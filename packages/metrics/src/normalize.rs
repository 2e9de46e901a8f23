//! Country name normalization for the widened matching policy.
//!
//! Applied symmetrically to both sides of the join so that
//! "Guinea-Bissau" matches "Guinea Bissau" and "Bahamas, The" matches
//! "the bahamas".

use std::sync::LazyLock;

use regex::Regex;

/// Punctuation that carries no identity.
static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,'’()\-/]+").expect("valid regex"));

/// Runs of whitespace.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalizes a country name.
///
/// 1. Lowercase
/// 2. `&` -> `and`
/// 3. Strip punctuation
/// 4. Collapse whitespace and trim
/// 5. Drop a leading or trailing article `the`
#[must_use]
pub fn normalize_name(input: &str) -> String {
    let lower = input.to_lowercase().replace('&', " and ");
    let no_punct = PUNCTUATION_RE.replace_all(&lower, " ");
    let collapsed = WHITESPACE_RE.replace_all(&no_punct, " ");
    let trimmed = collapsed.trim();

    let trimmed = trimmed.strip_prefix("the ").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(" the").unwrap_or(trimmed);
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case() {
        assert_eq!(normalize_name("FRANCE"), "france");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(normalize_name("Guinea-Bissau"), normalize_name("Guinea Bissau"));
        assert_eq!(normalize_name("St. Lucia"), "st lucia");
    }

    #[test]
    fn expands_ampersand() {
        assert_eq!(
            normalize_name("Bosnia & Herzegovina"),
            normalize_name("Bosnia and Herzegovina")
        );
    }

    #[test]
    fn drops_leading_and_trailing_article() {
        assert_eq!(normalize_name("The Bahamas"), "bahamas");
        assert_eq!(normalize_name("Bahamas, The"), "bahamas");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_name("  United   Kingdom "), "united kingdom");
    }
}
