//! Path/key mapping for the flat key space.
//!
//! Filesystem paths are relative, `/`-separated names; storage keys are the
//! same strings joined under the root prefix. Directory prefixes are
//! normalized so that the root maps to the empty string (no restriction)
//! and every named directory carries exactly one trailing `/`; root and
//! subdirectory listings then share one code path.

/// Reports whether `name` is a valid relative path for this filesystem.
///
/// Both `""` and `"."` address the root. Otherwise every `/`-separated
/// segment must be non-empty and must not be `"."` or `".."`.
pub(crate) fn valid_path(name: &str) -> bool {
    if name.is_empty() || name == "." {
        return true;
    }
    name.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// Joins two path fragments and drops empty and `"."` segments.
///
/// The result never has leading or trailing separators; joining nothing
/// yields the empty string (the root).
pub(crate) fn clean_join(dir: &str, name: &str) -> String {
    let mut out = String::with_capacity(dir.len() + name.len() + 1);
    for seg in dir.split('/').chain(name.split('/')) {
        if seg.is_empty() || seg == "." {
            continue;
        }
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(seg);
    }
    out
}

/// Canonicalizes a directory prefix: empty (or `"."`) becomes the empty
/// string, anything else gains exactly one trailing `/`.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let mut cleaned = clean_join(prefix, "");
    if !cleaned.is_empty() {
        cleaned.push('/');
    }
    cleaned
}

/// Strips the normalized root prefix from an absolute key.
pub(crate) fn rel<'a>(root_prefix: &str, key: &'a str) -> &'a str {
    key.strip_prefix(&normalize_prefix(root_prefix)).unwrap_or(key)
}

/// Final path segment; the empty path (root) is named `"."`.
pub(crate) fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => ".",
    }
}

/// Proper ancestors of a relative path, nearest first:
/// `"a/b/c"` yields `"a/b"`, then `"a"`.
pub(crate) fn parents(name: &str) -> impl Iterator<Item = &str> {
    let mut rest = name.trim_end_matches('/');
    std::iter::from_fn(move || {
        let cut = rest.rfind('/')?;
        rest = &rest[..cut];
        Some(rest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_path() {
        for ok in ["", ".", "a", "a/b", "dir0/file01.txt"] {
            assert!(valid_path(ok), "{ok:?} should be valid");
        }
        for bad in ["/", "/a", "a/", "a//b", "../a", "a/..", "a/./b"] {
            assert!(!valid_path(bad), "{bad:?} should be invalid");
        }
    }

    #[test]
    fn test_clean_join() {
        assert_eq!(clean_join("", ""), "");
        assert_eq!(clean_join("", "."), "");
        assert_eq!(clean_join("a", "b"), "a/b");
        assert_eq!(clean_join("a/", "b"), "a/b");
        assert_eq!(clean_join("", "b/c"), "b/c");
        assert_eq!(clean_join("a", "."), "a");
    }

    #[test]
    fn test_normalize_prefix() {
        // Table from the prefix-normalization contract.
        for (prefix, want) in [
            (".", ""),
            ("/.", ""),
            ("", ""),
            ("dir", "dir/"),
            ("dir/", "dir/"),
            ("dir/.", "dir/"),
            ("a/b", "a/b/"),
        ] {
            assert_eq!(normalize_prefix(prefix), want, "normalize_prefix({prefix:?})");
        }
    }

    #[test]
    fn test_rel() {
        assert_eq!(rel("dir", "dir/file.txt"), "file.txt");
        assert_eq!(rel("", "file.txt"), "file.txt");
        assert_eq!(rel("dir", "other/file.txt"), "other/file.txt");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(""), ".");
        assert_eq!(base_name("a"), "a");
        assert_eq!(base_name("a/b/c"), "c");
        assert_eq!(base_name("a/b/"), "b");
    }

    #[test]
    fn test_parents() {
        let got: Vec<_> = parents("a/b/c").collect();
        assert_eq!(got, vec!["a/b", "a"]);
        assert_eq!(parents("a").count(), 0);
        assert_eq!(parents("").count(), 0);
    }
}
