//! The narrow object-store capability this filesystem is built on.
//!
//! [`Bucket`] is the seam between the emulation layer and any concrete
//! storage: a real network client ([`RemoteBucket`]) and a deterministic
//! in-memory stand-in ([`MemoryBucket`]) implement it identically, so the
//! exact same listing, glob, and handle logic runs against both.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::StoreResult;

mod memory;
mod remote;

pub use memory::MemoryBucket;
pub use remote::RemoteBucket;

/// Raw record produced by a bucket listing.
///
/// Exactly one of `name` / `prefix` is populated: a non-empty `name` is an
/// object (file) record; an empty `name` with a non-empty `prefix` is a
/// synthetic common-prefix record standing in for a directory. Common
/// prefixes keep their trailing `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectAttrs {
    pub name: String,
    pub prefix: String,
    pub size: u64,
    pub updated: Option<DateTime<Utc>>,
}

impl ObjectAttrs {
    pub fn is_common_prefix(&self) -> bool {
        self.name.is_empty() && !self.prefix.is_empty()
    }

    /// Full key this record sorts under; the listing stream and the
    /// lister's cursor both order by this.
    pub fn sort_key(&self) -> &str {
        if self.name.is_empty() { &self.prefix } else { &self.name }
    }
}

/// Parameters for a bucket listing.
///
/// A `/` delimiter requests a one-level listing in which keys sharing a
/// prefix up to the next separator fold into one common-prefix record; no
/// delimiter requests the full recursive key enumeration. `prefix` may end
/// mid-segment (used by glob's literal-prefix pushdown). Records whose sort
/// key is lexicographically before `start_offset` are not returned; the
/// offset entry itself may be (resume skipping is the caller's job).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub prefix: String,
    pub delimiter: Option<char>,
    pub start_offset: String,
}

impl Query {
    /// One-level (non-recursive) listing with common-prefix folding.
    pub fn one_level(prefix: impl Into<String>, start_offset: impl Into<String>) -> Self {
        Query {
            prefix: prefix.into(),
            delimiter: Some('/'),
            start_offset: start_offset.into(),
        }
    }

    /// Full recursive listing of every key under the prefix.
    pub fn recursive(prefix: impl Into<String>) -> Self {
        Query { prefix: prefix.into(), delimiter: None, start_offset: String::new() }
    }
}

pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;
pub type ObjectSink = Box<dyn AsyncWrite + Send + Unpin>;
pub type AttrsStream = BoxStream<'static, StoreResult<ObjectAttrs>>;

/// Capability interface over one bucket of a flat object store.
///
/// All calls are synchronous network I/O from the caller's task: no retries,
/// no internal timeouts. Cancellation is dropping the future; in-flight
/// failures surface as opaque [`StoreError::Backend`] values.
///
/// [`StoreError::Backend`]: crate::StoreError::Backend
#[async_trait]
pub trait Bucket: Send + Sync {
    /// Fetches object metadata; a missing object is `StoreError::NotFound`.
    async fn attrs(&self, key: &str) -> StoreResult<ObjectAttrs>;

    /// Opens a byte stream reading the object's content.
    async fn reader(&self, key: &str) -> StoreResult<ObjectReader>;

    /// Opens a byte stream replacing the object's content. The object
    /// becomes visible only when the stream is shut down.
    async fn writer(&self, key: &str) -> StoreResult<ObjectSink>;

    /// Deletes one object; a missing object is `StoreError::NotFound`.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Lists records matching `query` in ascending `sort_key` order.
    async fn list(&self, query: Query) -> StoreResult<AttrsStream>;
}
