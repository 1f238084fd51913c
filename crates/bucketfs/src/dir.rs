//! Directory handle with cursor pagination over one-level listings.

use std::sync::Arc;

use futures::StreamExt;

use crate::entry::Entry;
use crate::error::{Error, Result, StoreError, to_path_error};
use crate::path;
use crate::store::{Bucket, Query};

/// Handle on a synthetic directory.
///
/// The handle is a listing cursor: bounded `read_dir` calls page through the
/// one-level listing under the directory's prefix, resuming from the full
/// key of the last entry returned. Entries fetched beyond a page boundary
/// are cached for the next call.
pub struct ObjectDir {
    store: Arc<dyn Bucket>,
    name: String,
    prefix: String,
    offset: String,
    cache: Vec<Entry>,
    eof: bool,
}

impl ObjectDir {
    pub(crate) fn new(store: Arc<dyn Bucket>, root_prefix: &str, name: &str) -> Self {
        let prefix = path::normalize_prefix(&path::clean_join(root_prefix, name));
        ObjectDir {
            store,
            name: name.to_string(),
            prefix,
            offset: String::new(),
            cache: Vec::new(),
            eof: false,
        }
    }

    /// Stat record for the directory itself.
    pub fn entry(&self) -> Entry {
        Entry::dir(&self.prefix)
    }

    /// Path the handle was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Confirms the directory exists by listing its first entries.
    ///
    /// An empty listing means either nothing exists under the prefix or
    /// some ancestor is a plain object; the two produce different errors,
    /// so ancestors are probed to tell them apart.
    pub(crate) async fn open(mut self, n: usize) -> Result<Self> {
        let entries = self.list(Some(n), "open").await?;
        if entries.is_empty() {
            return Err(self.open_error().await?);
        }
        self.cache = entries;
        Ok(self)
    }

    async fn open_error(&self) -> Result<Error> {
        let trimmed = self.prefix.trim_end_matches('/');
        if !trimmed.is_empty() && self.store.attrs(trimmed).await.is_ok() {
            // The path itself names a plain object.
            return Ok(Error::not_a_directory("open", &self.name));
        }
        for parent in path::parents(trimmed) {
            match self.store.attrs(parent).await {
                Ok(_) => return Ok(Error::not_a_directory("open", &self.name)),
                Err(StoreError::NotFound) => continue,
                Err(err) => return Err(to_path_error(err, "open", &self.name)),
            }
        }
        Ok(Error::not_found("open", &self.name))
    }

    /// Reads directory entries.
    ///
    /// With no bound, returns every remaining entry sorted by name. With a
    /// bound `n`, returns up to `n` entries in listing (key) order and
    /// advances the cursor; once the listing is exhausted, further bounded
    /// reads return an empty batch.
    pub async fn read_dir(&mut self, n: Option<usize>) -> Result<Vec<Entry>> {
        let n = n.filter(|&n| n > 0);
        let mut entries = self.list(n, "read_dir").await?;
        if n.is_none() {
            entries.sort_by(|a, b| a.name().cmp(b.name()));
        }
        Ok(entries)
    }

    async fn list(&mut self, n: Option<usize>, op: &'static str) -> Result<Vec<Entry>> {
        let mut entries = std::mem::take(&mut self.cache);
        if let Some(limit) = n
            && entries.len() >= limit
        {
            self.cache = entries.split_off(limit);
            return Ok(entries);
        }
        if self.eof {
            return Ok(entries);
        }

        let query = Query::one_level(self.prefix.clone(), self.offset.clone());
        let mut stream = self
            .store
            .list(query)
            .await
            .map_err(|err| to_path_error(err, op, &self.name))?;
        loop {
            let Some(record) = stream.next().await else {
                self.eof = true;
                break;
            };
            let attrs = record.map_err(|err| to_path_error(err, op, &self.name))?;
            // The cursor entry itself comes back on resume; skip through it.
            if !self.offset.is_empty() && self.offset.as_str() >= attrs.sort_key() {
                continue;
            }
            self.offset = attrs.sort_key().to_string();
            entries.push(Entry::from_attrs(&attrs));
            if let Some(limit) = n
                && entries.len() >= limit
            {
                break;
            }
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for ObjectDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectDir")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("offset", &self.offset)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}
