use chrono::{DateTime, Utc};

use crate::path::base_name;
use crate::store::ObjectAttrs;

/// A directory entry / stat record.
///
/// `name` is the final path segment only. Synthetic directory entries carry
/// zero size and no modification time: directories have no persisted
/// representation in the flat key space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    is_dir: bool,
    size: u64,
    modified: Option<DateTime<Utc>>,
}

impl Entry {
    /// Builds an entry from a raw listing record: an empty object name with
    /// a non-empty common prefix denotes a synthetic directory.
    pub(crate) fn from_attrs(attrs: &ObjectAttrs) -> Self {
        if attrs.name.is_empty() {
            Entry::dir(&attrs.prefix)
        } else {
            Entry::file(attrs)
        }
    }

    /// Synthetic directory entry for a key prefix; the trailing separator
    /// is stripped before base-naming. The empty prefix names the root `.`.
    pub(crate) fn dir(prefix: &str) -> Self {
        Entry {
            name: base_name(prefix.trim_end_matches('/')).to_string(),
            is_dir: true,
            size: 0,
            modified: None,
        }
    }

    pub(crate) fn file(attrs: &ObjectAttrs) -> Self {
        Entry {
            name: base_name(&attrs.name).to_string(),
            is_dir: false,
            size: attrs.size,
            modified: attrs.updated,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_entry_from_common_prefix() {
        let attrs = ObjectAttrs { prefix: "a/b/dir0/".to_string(), ..Default::default() };
        let entry = Entry::from_attrs(&attrs);
        assert_eq!(entry.name(), "dir0");
        assert!(entry.is_dir());
        assert_eq!(entry.size(), 0);
        assert_eq!(entry.modified(), None);
    }

    #[test]
    fn test_file_entry_from_attrs() {
        let updated = Utc::now();
        let attrs = ObjectAttrs {
            name: "a/b/file01.txt".to_string(),
            size: 42,
            updated: Some(updated),
            ..Default::default()
        };
        let entry = Entry::from_attrs(&attrs);
        assert_eq!(entry.name(), "file01.txt");
        assert!(!entry.is_dir());
        assert_eq!(entry.size(), 42);
        assert_eq!(entry.modified(), Some(updated));
    }

    #[test]
    fn test_root_dir_entry() {
        assert_eq!(Entry::dir("").name(), ".");
    }
}
