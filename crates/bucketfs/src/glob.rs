//! Glob matching helpers.
//!
//! Patterns follow shell-style matching with `*`, `?`, and character
//! classes, where separators must be matched literally: `*` never crosses a
//! `/`. Each helper works on one path level; the full multi-level walk
//! lives with the filesystem facade.

use ::glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};
use crate::path::clean_join;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiles a pattern, rejecting malformed syntax up front.
pub(crate) fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|err| Error::invalid_pattern(pattern, err))
}

pub(crate) fn matches(pattern: &Pattern, name: &str) -> bool {
    pattern.matches_with(name, MATCH_OPTIONS)
}

/// Pushes `name` if it matches and is not already present. Listings under
/// partial-segment prefixes can surface the same path twice across levels.
pub(crate) fn append_if_match(found: &mut Vec<String>, name: &str, pattern: &Pattern) {
    if matches(pattern, name) && !found.iter().any(|have| have == name) {
        found.push(name.to_string());
    }
}

/// Longest literal key prefix of `pattern` joined under `dir`: everything
/// up to the first metacharacter. Listing under this prefix narrows the
/// scan without losing any candidate match.
pub(crate) fn prefix_pattern(dir: &str, pattern: &str) -> String {
    let joined = clean_join(dir, pattern);
    let literal = literal_prefix(&joined);
    joined[..literal.len()].to_string()
}

fn literal_prefix(pattern: &str) -> &str {
    match pattern.find(['*', '?', '[', '\\']) {
        Some(cut) => &pattern[..cut],
        None => pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_rejects_malformed() {
        assert!(compile("file[0.txt").is_err());
        let err = compile("[").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }), "{err}");
    }

    #[test]
    fn test_separator_is_literal() {
        let pattern = compile("*").unwrap();
        assert!(matches(&pattern, "file0.txt"));
        assert!(!matches(&pattern, "dir0/file01.txt"));

        let pattern = compile("dir*/file0?.txt").unwrap();
        assert!(matches(&pattern, "dir0/file01.txt"));
        assert!(!matches(&pattern, "dir0/sub/file01.txt"));
    }

    #[test]
    fn test_append_if_match_dedupes() {
        let pattern = compile("file*").unwrap();
        let mut found = Vec::new();
        append_if_match(&mut found, "file0.txt", &pattern);
        append_if_match(&mut found, "file0.txt", &pattern);
        append_if_match(&mut found, "other.txt", &pattern);
        assert_eq!(found, vec!["file0.txt"]);
    }

    #[test]
    fn test_prefix_pattern() {
        assert_eq!(prefix_pattern("", "dir*"), "dir");
        assert_eq!(prefix_pattern("", "dir0"), "dir0");
        assert_eq!(prefix_pattern("dir0", "file0?.txt"), "dir0/file0");
        assert_eq!(prefix_pattern("", "*"), "");
        assert_eq!(prefix_pattern("a", "[bc]"), "a/");
    }
}
