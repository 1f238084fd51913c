//! Error types for the filesystem facade and the storage backend.
//!
//! Two vocabularies are kept deliberately separate. [`StoreError`] is what
//! backends speak: a typed not-found plus opaque passthrough failures.
//! [`Error`] is what filesystem callers see: every variant is scoped to an
//! operation and a path. The conversion functions below are the only bridge
//! between the two; nothing in this crate matches on error message text.

pub type Result<T> = std::result::Result<T, Error>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Backend-facing errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The named object does not exist in the bucket.
    #[error("object not found")]
    NotFound,

    /// Opaque failure from the object-store client, including cancellation.
    #[error(transparent)]
    Backend(object_store::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Opaque failure from a backend layered on another filesystem.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl From<object_store::Error> for StoreError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { .. } => StoreError::NotFound,
            other => StoreError::Backend(other),
        }
    }
}

/// Filesystem-facing errors. Every variant carries the operation name and
/// the path it applies to, so callers can test with generic predicates
/// regardless of which backend produced the failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{op} {path}: invalid path")]
    InvalidPath { op: &'static str, path: String },

    #[error("{op} {path}: not found")]
    NotFound { op: &'static str, path: String },

    #[error("{op} {path}: is a directory")]
    IsADirectory { op: &'static str, path: String },

    #[error("{op} {path}: not a directory")]
    NotADirectory { op: &'static str, path: String },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Backend failure wrapped with operation and path context.
    #[error("{op} {path}: {source}")]
    Store {
        op: &'static str,
        path: String,
        #[source]
        source: StoreError,
    },
}

impl Error {
    pub fn invalid_path(op: &'static str, path: impl Into<String>) -> Self {
        Error::InvalidPath { op, path: path.into() }
    }

    pub fn not_found(op: &'static str, path: impl Into<String>) -> Self {
        Error::NotFound { op, path: path.into() }
    }

    pub fn is_a_directory(op: &'static str, path: impl Into<String>) -> Self {
        Error::IsADirectory { op, path: path.into() }
    }

    pub fn not_a_directory(op: &'static str, path: impl Into<String>) -> Self {
        Error::NotADirectory { op, path: path.into() }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, source: glob::PatternError) -> Self {
        Error::InvalidPattern { pattern: pattern.into(), source }
    }

    /// True for the not-found kind, ignoring the attached op/path context.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// The operation during which the error occurred, if path-scoped.
    pub fn op(&self) -> Option<&'static str> {
        match self {
            Error::InvalidPath { op, .. }
            | Error::NotFound { op, .. }
            | Error::IsADirectory { op, .. }
            | Error::NotADirectory { op, .. }
            | Error::Store { op, .. } => Some(op),
            Error::InvalidPattern { .. } => None,
        }
    }

    /// The path the error applies to, if path-scoped.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::InvalidPath { path, .. }
            | Error::NotFound { path, .. }
            | Error::IsADirectory { path, .. }
            | Error::NotADirectory { path, .. }
            | Error::Store { path, .. } => Some(path),
            Error::InvalidPattern { .. } => None,
        }
    }
}

/// Wraps a backend error with `{op, path}` context, normalizing the
/// backend's not-found signal to the filesystem [`Error::NotFound`] kind.
/// All other backend failures pass through opaquely inside
/// [`Error::Store`].
pub fn to_path_error(err: StoreError, op: &'static str, path: &str) -> Error {
    match err {
        StoreError::NotFound => Error::not_found(op, path),
        other => Error::Store { op, path: path.to_string(), source: other },
    }
}

/// Inverse translation: turns a filesystem-level not-found back into the
/// backend's vocabulary. Used by backends layered on another filesystem
/// facade; other error kinds pass through opaquely.
pub fn to_store_not_found(err: Error) -> StoreError {
    if err.is_not_found() {
        StoreError::NotFound
    } else {
        StoreError::Other(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(Error::not_found("open", "test.txt").is_not_found());
        assert!(!Error::invalid_path("open", "test.txt").is_not_found());
        assert!(
            !to_path_error(StoreError::Io(std::io::Error::other("boom")), "open", "x")
                .is_not_found()
        );
    }

    #[test]
    fn test_to_path_error_normalizes_not_found() {
        let err = to_path_error(StoreError::NotFound, "open", "test.txt");
        assert!(matches!(
            &err,
            Error::NotFound { op: "open", path } if path == "test.txt"
        ));
    }

    #[test]
    fn test_to_path_error_passes_other_kinds_through() {
        let err = to_path_error(StoreError::Io(std::io::Error::other("boom")), "open", "a/b");
        match err {
            Error::Store { op, path, source: StoreError::Io(_) } => {
                assert_eq!(op, "open");
                assert_eq!(path, "a/b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_to_store_not_found() {
        assert!(matches!(
            to_store_not_found(Error::not_found("stat", "x")),
            StoreError::NotFound
        ));
        assert!(matches!(
            to_store_not_found(Error::is_a_directory("create_file", "d")),
            StoreError::Other(_)
        ));
    }

    #[test]
    fn test_from_object_store_error() {
        let missing = object_store::Error::NotFound {
            path: "test.txt".to_string(),
            source: Box::new(std::io::Error::other("404")),
        };
        assert!(matches!(StoreError::from(missing), StoreError::NotFound));

        let other = object_store::Error::Generic {
            store: "test",
            source: Box::new(std::io::Error::other("500")),
        };
        assert!(matches!(StoreError::from(other), StoreError::Backend(_)));
    }

    #[test]
    fn test_op_and_path_context() {
        let err = Error::not_a_directory("create_file", "a/b");
        assert_eq!(err.op(), Some("create_file"));
        assert_eq!(err.path(), Some("a/b"));
    }
}
