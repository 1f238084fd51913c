//! In-memory [`Bucket`] used by tests and local tooling.
//!
//! A sorted key map gives the same ascending listing order, common-prefix
//! folding, partial-segment prefixes, and start offsets as the network
//! backend, deterministically and without I/O.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream;
use tokio::io::AsyncWrite;

use crate::error::{StoreError, StoreResult};
use crate::store::{AttrsStream, Bucket, ObjectAttrs, ObjectReader, ObjectSink, Query};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    updated: DateTime<Utc>,
}

type ObjectMap = BTreeMap<String, StoredObject>;

/// Deterministic in-memory bucket.
#[derive(Debug, Default, Clone)]
pub struct MemoryBucket {
    objects: Arc<Mutex<ObjectMap>>,
}

impl MemoryBucket {
    pub fn new() -> Self {
        MemoryBucket::default()
    }

    /// Seeds an object directly, bypassing the writer path.
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        self.lock()
            .insert(key.into(), StoredObject { data: data.into(), updated: Utc::now() });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ObjectMap> {
        // Lock poisoning only happens if a holder panicked; propagate.
        match self.objects.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn collect(&self, query: &Query) -> Vec<ObjectAttrs> {
        let objects = self.lock();
        let mut records = Vec::new();
        // Tracks the common prefix most recently folded; keys are sorted,
        // so everything under one prefix is contiguous.
        let mut last_common: Option<String> = None;
        for (key, object) in objects.range(query.prefix.clone()..) {
            if !key.starts_with(&query.prefix) {
                break;
            }
            let attrs = match query.delimiter {
                Some(delimiter) => {
                    let remainder = &key[query.prefix.len()..];
                    match remainder.find(delimiter) {
                        Some(cut) => {
                            let common = &key[..query.prefix.len() + cut + 1];
                            if last_common.as_deref() == Some(common) {
                                continue;
                            }
                            last_common = Some(common.to_string());
                            ObjectAttrs { prefix: common.to_string(), ..Default::default() }
                        }
                        None => ObjectAttrs {
                            name: key.clone(),
                            size: object.data.len() as u64,
                            updated: Some(object.updated),
                            ..Default::default()
                        },
                    }
                }
                None => ObjectAttrs {
                    name: key.clone(),
                    size: object.data.len() as u64,
                    updated: Some(object.updated),
                    ..Default::default()
                },
            };
            if !query.start_offset.is_empty() && attrs.sort_key() < query.start_offset.as_str() {
                continue;
            }
            records.push(attrs);
        }
        records
    }
}

#[async_trait]
impl Bucket for MemoryBucket {
    async fn attrs(&self, key: &str) -> StoreResult<ObjectAttrs> {
        let objects = self.lock();
        let object = objects.get(key).ok_or(StoreError::NotFound)?;
        Ok(ObjectAttrs {
            name: key.to_string(),
            size: object.data.len() as u64,
            updated: Some(object.updated),
            ..Default::default()
        })
    }

    async fn reader(&self, key: &str) -> StoreResult<ObjectReader> {
        let data = {
            let objects = self.lock();
            objects.get(key).ok_or(StoreError::NotFound)?.data.clone()
        };
        Ok(Box::new(std::io::Cursor::new(data)))
    }

    async fn writer(&self, key: &str) -> StoreResult<ObjectSink> {
        Ok(Box::new(MemoryWriter {
            key: key.to_string(),
            buffer: Vec::new(),
            objects: Arc::clone(&self.objects),
            committed: false,
        }))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.lock().remove(key).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list(&self, query: Query) -> StoreResult<AttrsStream> {
        let records = self.collect(&query);
        Ok(Box::pin(stream::iter(records.into_iter().map(Ok))))
    }
}

/// Buffers writes and commits the object atomically on shutdown.
struct MemoryWriter {
    key: String,
    buffer: Vec<u8>,
    objects: Arc<Mutex<ObjectMap>>,
    committed: bool,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        self.buffer.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        if !self.committed {
            self.committed = true;
            let data = Bytes::from(std::mem::take(&mut self.buffer));
            let stored = StoredObject { data, updated: Utc::now() };
            let key = self.key.clone();
            match self.objects.lock() {
                Ok(mut objects) => {
                    objects.insert(key, stored);
                }
                Err(poisoned) => {
                    poisoned.into_inner().insert(key, stored);
                }
            }
        }
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn seeded() -> MemoryBucket {
        let bucket = MemoryBucket::new();
        bucket.insert("file0.txt", "content0\n");
        bucket.insert("file1.txt", "content1\n");
        bucket.insert("dir0/file01.txt", "content01\n");
        bucket.insert("dir0/file02.txt", "content02\n");
        bucket.insert("dir1/x.txt", "x\n");
        bucket
    }

    async fn sort_keys(bucket: &MemoryBucket, query: Query) -> Vec<String> {
        let mut stream = bucket.list(query).await.unwrap();
        let mut keys = Vec::new();
        while let Some(attrs) = stream.next().await {
            keys.push(attrs.unwrap().sort_key().to_string());
        }
        keys
    }

    #[tokio::test]
    async fn test_one_level_listing_folds_common_prefixes() {
        let keys = sort_keys(&seeded(), Query::one_level("", "")).await;
        assert_eq!(keys, vec!["dir0/", "dir1/", "file0.txt", "file1.txt"]);
    }

    #[tokio::test]
    async fn test_one_level_listing_under_prefix() {
        let keys = sort_keys(&seeded(), Query::one_level("dir0/", "")).await;
        assert_eq!(keys, vec!["dir0/file01.txt", "dir0/file02.txt"]);
    }

    #[tokio::test]
    async fn test_partial_segment_prefix() {
        let keys = sort_keys(&seeded(), Query::one_level("file", "")).await;
        assert_eq!(keys, vec!["file0.txt", "file1.txt"]);

        let keys = sort_keys(&seeded(), Query::one_level("dir0/file0", "")).await;
        assert_eq!(keys, vec!["dir0/file01.txt", "dir0/file02.txt"]);
    }

    #[tokio::test]
    async fn test_start_offset_is_inclusive() {
        let keys = sort_keys(&seeded(), Query::one_level("", "file0.txt")).await;
        assert_eq!(keys, vec!["file0.txt", "file1.txt"]);
    }

    #[tokio::test]
    async fn test_recursive_listing() {
        let keys = sort_keys(&seeded(), Query::recursive("dir0/")).await;
        assert_eq!(keys, vec!["dir0/file01.txt", "dir0/file02.txt"]);

        let all = sort_keys(&seeded(), Query::recursive("")).await;
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_attrs_and_missing() {
        let bucket = seeded();
        let attrs = bucket.attrs("file0.txt").await.unwrap();
        assert_eq!(attrs.name, "file0.txt");
        assert_eq!(attrs.size, 9);
        assert!(attrs.updated.is_some());

        assert!(matches!(
            bucket.attrs("not-exist.txt").await,
            Err(StoreError::NotFound)
        ));
        // Directories have no independent existence.
        assert!(matches!(bucket.attrs("dir0").await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_writer_commits_on_shutdown() {
        let bucket = MemoryBucket::new();
        let mut writer = bucket.writer("test.txt").await.unwrap();
        writer.write_all(b"test").await.unwrap();
        assert!(!bucket.contains("test.txt"));
        writer.shutdown().await.unwrap();
        assert!(bucket.contains("test.txt"));

        let mut reader = bucket.reader("test.txt").await.unwrap();
        let mut got = Vec::new();
        reader.read_to_end(&mut got).await.unwrap();
        assert_eq!(got, b"test");
    }

    #[tokio::test]
    async fn test_delete() {
        let bucket = seeded();
        bucket.delete("file0.txt").await.unwrap();
        assert!(!bucket.contains("file0.txt"));
        assert!(matches!(
            bucket.delete("file0.txt").await,
            Err(StoreError::NotFound)
        ));
    }
}
