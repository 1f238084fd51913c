//! [`Bucket`] adapter over an [`object_store::ObjectStore`] client.
//!
//! The client owns transport, credentials, and retry policy; this adapter
//! only reshapes the API: metadata into [`ObjectAttrs`], get-streams into
//! `AsyncRead`, buffered multipart uploads into `AsyncWrite`, and the two
//! listing modes into the single [`Query`] contract.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::{ObjectMeta, ObjectStore};
use tokio_util::io::StreamReader;

use crate::error::{StoreError, StoreResult};
use crate::store::{AttrsStream, Bucket, ObjectAttrs, ObjectReader, ObjectSink, Query};

/// Network-backed bucket.
#[derive(Debug, Clone)]
pub struct RemoteBucket {
    store: Arc<dyn ObjectStore>,
}

impl RemoteBucket {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        RemoteBucket { store }
    }

    /// Connects to a GCS bucket, taking credentials and endpoint
    /// configuration from the environment.
    pub fn gcs(bucket: &str) -> StoreResult<Self> {
        let store = object_store::gcp::GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()?;
        Ok(RemoteBucket::new(Arc::new(store)))
    }

    fn to_attrs(meta: &ObjectMeta) -> ObjectAttrs {
        ObjectAttrs {
            name: meta.location.to_string(),
            size: meta.size,
            updated: Some(meta.last_modified),
            ..Default::default()
        }
    }

    /// One-level listing. The client API only accepts whole-segment
    /// prefixes, so the directory part is pushed down and any
    /// partial-segment tail plus the start offset are applied here; the
    /// emulation layer re-filters against its cursor either way.
    async fn list_one_level(&self, query: &Query) -> StoreResult<Vec<ObjectAttrs>> {
        let dir_part = match query.prefix.rfind('/') {
            Some(cut) => &query.prefix[..cut],
            None => "",
        };
        let prefix_path = (!dir_part.is_empty()).then(|| Path::from(dir_part));
        let listing = self.store.list_with_delimiter(prefix_path.as_ref()).await?;

        let mut records = Vec::with_capacity(
            listing.common_prefixes.len() + listing.objects.len(),
        );
        for common in &listing.common_prefixes {
            records.push(ObjectAttrs {
                prefix: format!("{}/", common),
                ..Default::default()
            });
        }
        for meta in &listing.objects {
            records.push(Self::to_attrs(meta));
        }
        records.retain(|attrs| {
            attrs.sort_key().starts_with(&query.prefix)
                && (query.start_offset.is_empty()
                    || attrs.sort_key() >= query.start_offset.as_str())
        });
        records.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
        Ok(records)
    }
}

#[async_trait::async_trait]
impl Bucket for RemoteBucket {
    async fn attrs(&self, key: &str) -> StoreResult<ObjectAttrs> {
        let meta = self.store.head(&Path::from(key)).await?;
        Ok(Self::to_attrs(&meta))
    }

    async fn reader(&self, key: &str) -> StoreResult<ObjectReader> {
        let result = self.store.get(&Path::from(key)).await?;
        let stream = result.into_stream().map_err(std::io::Error::other);
        Ok(Box::new(StreamReader::new(stream)))
    }

    async fn writer(&self, key: &str) -> StoreResult<ObjectSink> {
        Ok(Box::new(BufWriter::new(Arc::clone(&self.store), Path::from(key))))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.store.delete(&Path::from(key)).await?;
        Ok(())
    }

    async fn list(&self, query: Query) -> StoreResult<AttrsStream> {
        match query.delimiter {
            Some(_) => {
                let records = self.list_one_level(&query).await?;
                Ok(Box::pin(stream::iter(records.into_iter().map(Ok))))
            }
            None => {
                let trimmed = query.prefix.trim_end_matches('/');
                let prefix_path = (!trimmed.is_empty()).then(|| Path::from(trimmed));
                let listing = if query.start_offset.is_empty() {
                    self.store.list(prefix_path.as_ref())
                } else {
                    self.store
                        .list_with_offset(prefix_path.as_ref(), &Path::from(query.start_offset))
                };
                Ok(Box::pin(listing.map(|item| {
                    item.map(|meta| Self::to_attrs(&meta)).map_err(StoreError::from)
                })))
            }
        }
    }
}
