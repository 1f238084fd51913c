//! Filesystem facade over a flat bucket.
//!
//! Hierarchy is emulated: directories are key prefixes with no persisted
//! representation, so a directory "exists" exactly when at least one object
//! lives under its prefix, the root included. All paths are relative
//! `/`-separated names; `""` and `"."` both address the root.

use std::sync::Arc;

use futures::StreamExt;

use crate::dir::ObjectDir;
use crate::entry::Entry;
use crate::error::{Error, Result, StoreResult, to_path_error};
use crate::file::{ObjectFile, ObjectWriter};
use crate::glob::{append_if_match, compile, prefix_pattern};
use crate::path;
use crate::store::{Bucket, Query, RemoteBucket};

/// How many entries a directory open fetches to confirm existence; the
/// surplus is cached for the first read.
pub const DEFAULT_DIR_OPEN_BUFFER_SIZE: usize = 100;

/// Filesystem view of one bucket, optionally rooted under a key prefix.
///
/// Cloning is cheap and clones share the backend connection.
#[derive(Clone)]
pub struct BucketFs {
    store: Arc<dyn Bucket>,
    prefix: String,
    dir_open_buffer_size: usize,
}

/// An opened path: a readable object or a directory listing cursor.
#[derive(Debug)]
pub enum Node {
    File(ObjectFile),
    Dir(ObjectDir),
}

impl Node {
    pub fn entry(&self) -> Entry {
        match self {
            Node::File(file) => file.entry().clone(),
            Node::Dir(dir) => dir.entry(),
        }
    }
}

impl BucketFs {
    pub fn new(store: Arc<dyn Bucket>) -> Self {
        BucketFs {
            store,
            prefix: String::new(),
            dir_open_buffer_size: DEFAULT_DIR_OPEN_BUFFER_SIZE,
        }
    }

    /// Connects to a GCS bucket, taking credentials from the environment.
    pub fn gcs(bucket: &str) -> StoreResult<Self> {
        Ok(BucketFs::new(Arc::new(RemoteBucket::gcs(bucket)?)))
    }

    pub fn with_dir_open_buffer_size(mut self, n: usize) -> Self {
        self.dir_open_buffer_size = n.max(1);
        self
    }

    /// Storage key for a relative path.
    fn key(&self, name: &str) -> String {
        path::clean_join(&self.prefix, name)
    }

    fn dir(&self, name: &str) -> ObjectDir {
        ObjectDir::new(Arc::clone(&self.store), &self.prefix, name)
    }

    fn check_path(&self, op: &'static str, name: &str) -> Result<()> {
        if path::valid_path(name) {
            Ok(())
        } else {
            Err(Error::invalid_path(op, name))
        }
    }

    /// Opens the object at `name` as a file, without any directory
    /// fallback. The root (empty key) never names an object.
    async fn open_object(&self, op: &'static str, name: &str) -> Result<ObjectFile> {
        let key = self.key(name);
        if key.is_empty() {
            return Err(Error::not_found(op, name));
        }
        let attrs = self
            .store
            .attrs(&key)
            .await
            .map_err(|err| to_path_error(err, op, name))?;
        Ok(ObjectFile::new(Arc::clone(&self.store), key, &attrs))
    }

    /// Opens `name` as a file if an object exists under its key, otherwise
    /// as a directory if anything exists under its prefix.
    pub async fn open(&self, name: &str) -> Result<Node> {
        self.check_path("open", name)?;
        match self.open_object("open", name).await {
            Ok(file) => Ok(Node::File(file)),
            Err(err) if err.is_not_found() => {
                let dir = self.dir(name).open(self.dir_open_buffer_size).await?;
                Ok(Node::Dir(dir))
            }
            Err(err) => Err(err),
        }
    }

    /// Stat record for `name`; files win over same-named prefixes.
    pub async fn stat(&self, name: &str) -> Result<Entry> {
        self.check_path("stat", name)?;
        match self.open_object("stat", name).await {
            Ok(file) => Ok(file.entry().clone()),
            Err(err) if err.is_not_found() => {
                Ok(self.dir(name).open(1).await?.entry())
            }
            Err(err) => Err(err),
        }
    }

    /// All entries of the directory `name`, sorted by entry name.
    pub async fn read_dir(&self, name: &str) -> Result<Vec<Entry>> {
        self.check_path("read_dir", name)?;
        let mut dir = self.dir(name).open(self.dir_open_buffer_size).await?;
        dir.read_dir(None).await
    }

    /// Full content of the object at `name`.
    pub async fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        self.check_path("read_file", name)?;
        let mut file = self.open_object("read_file", name).await?;
        let data = file.read_to_end().await?;
        file.close()?;
        Ok(data)
    }

    /// A view rooted at the subdirectory `dir`, sharing this view's
    /// backend. The subdirectory need not exist yet.
    pub fn sub(&self, dir: &str) -> Result<BucketFs> {
        self.check_path("sub", dir)?;
        Ok(BucketFs {
            store: Arc::clone(&self.store),
            prefix: self.key(dir),
            dir_open_buffer_size: self.dir_open_buffer_size,
        })
    }

    /// Opens a writer for the object at `name`, replacing any existing
    /// content. Fails if `name` or one of its ancestors is a directory or
    /// an object, respectively; nothing is written until the handle is
    /// closed.
    pub async fn create_file(&self, name: &str) -> Result<ObjectWriter> {
        self.check_path("create_file", name)?;
        let key = self.key(name);
        if key.is_empty() {
            return Err(Error::is_a_directory("create_file", name));
        }
        match self.open_object("create_file", name).await {
            // Overwriting an existing object is allowed.
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                if self.dir(name).open(1).await.is_ok() {
                    return Err(Error::is_a_directory("create_file", name));
                }
                for parent in path::parents(name) {
                    match self.open_object("create_file", parent).await {
                        Ok(_) => {
                            return Err(Error::not_a_directory("create_file", name));
                        }
                        Err(err) if err.is_not_found() => continue,
                        Err(err) => return Err(err),
                    }
                }
            }
            Err(err) => return Err(err),
        }
        emit::debug!("creating {key}", key: key.as_str());
        Ok(ObjectWriter::new(Arc::clone(&self.store), key, name))
    }

    /// Writes `data` as the complete content of the object at `name`.
    pub async fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        let mut writer = self.create_file(name).await?;
        writer.write(data).await?;
        writer.close().await
    }

    /// Removes the object at `name`; directories cannot be removed here.
    pub async fn remove_file(&self, name: &str) -> Result<()> {
        self.check_path("remove_file", name)?;
        let key = self.key(name);
        self.store
            .delete(&key)
            .await
            .map_err(|err| to_path_error(err, "remove_file", name))
    }

    /// Removes every object under the directory `dir`. A missing directory
    /// is not an error; the first failed deletion aborts the walk.
    pub async fn remove_all(&self, dir: &str) -> Result<()> {
        self.check_path("remove_all", dir)?;
        let prefix = path::normalize_prefix(&self.key(dir));
        let mut stream = self
            .store
            .list(Query::recursive(prefix))
            .await
            .map_err(|err| to_path_error(err, "remove_all", dir))?;
        let mut removed = 0usize;
        while let Some(record) = stream.next().await {
            let attrs = record.map_err(|err| to_path_error(err, "remove_all", dir))?;
            self.store
                .delete(attrs.sort_key())
                .await
                .map_err(|err| to_path_error(err, "remove_all", attrs.sort_key()))?;
            removed += 1;
        }
        emit::debug!("removed {removed} objects under {dir}", removed: removed, dir: dir);
        Ok(())
    }

    /// Directories are synthetic, so there is nothing to create; the call
    /// only validates the path.
    pub async fn mkdir_all(&self, dir: &str) -> Result<()> {
        self.check_path("mkdir_all", dir)
    }

    /// Paths matching a shell-style pattern, sorted. `*` and `?` never
    /// cross a `/`; an empty result is not an error.
    pub async fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        if pattern.is_empty() || pattern == "*" {
            return match self.read_dir("").await {
                Ok(entries) => Ok(entries.iter().map(|e| e.name().to_string()).collect()),
                Err(err) if err.is_not_found() => Ok(Vec::new()),
                Err(err) => Err(err),
            };
        }
        let full = compile(pattern)?;

        // Walk the pattern one level at a time: each segment expands the
        // concrete directories matched so far, with the joined pattern's
        // literal prefix pushed down to narrow every listing.
        let segments: Vec<&str> = pattern.split('/').collect();
        let mut dirs = vec![String::new()];
        let mut found = Vec::new();
        for (depth, segment) in segments.iter().enumerate() {
            let last = depth + 1 == segments.len();
            let mut next_dirs = Vec::new();
            for dir in &dirs {
                let level = path::clean_join(dir, segment);
                let (names, sub_dirs) = self.list_for_glob(&level, !last).await?;
                if last {
                    for name in names.iter().chain(sub_dirs.iter()) {
                        append_if_match(&mut found, name, &full);
                    }
                } else {
                    next_dirs.extend(sub_dirs);
                }
            }
            if last {
                break;
            }
            if next_dirs.is_empty() {
                return Ok(Vec::new());
            }
            dirs = next_dirs;
        }
        found.sort();
        Ok(found)
    }

    /// One glob level: lists under the pattern's literal key prefix and
    /// filters against the level pattern, returning matched file paths and
    /// matched directory paths separately. With `dir_only`, file records
    /// are not considered.
    async fn list_for_glob(
        &self,
        pattern: &str,
        dir_only: bool,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let level = compile(pattern)?;
        let query = Query::one_level(prefix_pattern(&self.prefix, pattern), "");
        let mut stream = self
            .store
            .list(query)
            .await
            .map_err(|err| to_path_error(err, "glob", pattern))?;
        let mut names = Vec::new();
        let mut sub_dirs = Vec::new();
        while let Some(record) = stream.next().await {
            let attrs = record.map_err(|err| to_path_error(err, "glob", pattern))?;
            if attrs.is_common_prefix() {
                let rel = path::rel(&self.prefix, &attrs.prefix).trim_end_matches('/');
                append_if_match(&mut sub_dirs, rel, &level);
            } else if !dir_only {
                let rel = path::rel(&self.prefix, &attrs.name);
                append_if_match(&mut names, rel, &level);
            }
        }
        Ok((names, sub_dirs))
    }
}

impl std::fmt::Debug for BucketFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketFs")
            .field("prefix", &self.prefix)
            .field("dir_open_buffer_size", &self.dir_open_buffer_size)
            .finish_non_exhaustive()
    }
}
