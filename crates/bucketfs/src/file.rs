//! Read and write handles over a single object.
//!
//! Both handles open their underlying stream lazily: a handle used only for
//! its metadata never touches the network, and a writer that is closed
//! without a write creates nothing.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::entry::Entry;
use crate::error::{Result, to_path_error};
use crate::store::{Bucket, ObjectAttrs, ObjectReader, ObjectSink};

/// Readable handle over one existing object.
pub struct ObjectFile {
    entry: Entry,
    key: String,
    store: Arc<dyn Bucket>,
    input: Option<ObjectReader>,
}

impl ObjectFile {
    pub(crate) fn new(store: Arc<dyn Bucket>, key: String, attrs: &ObjectAttrs) -> Self {
        ObjectFile { entry: Entry::file(attrs), key, store, input: None }
    }

    /// Stat record captured when the handle was opened.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Reads up to `buf.len()` bytes, opening the stream on first use.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut input = self.input_stream().await?;
        let n = input
            .read(buf)
            .await
            .map_err(|err| to_path_error(err.into(), "read", &self.key))?;
        self.input = Some(input);
        Ok(n)
    }

    /// Reads the remaining content to completion.
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut input = self.input_stream().await?;
        let mut data = Vec::new();
        input
            .read_to_end(&mut data)
            .await
            .map_err(|err| to_path_error(err.into(), "read", &self.key))?;
        self.input = Some(input);
        Ok(data)
    }

    async fn input_stream(&mut self) -> Result<ObjectReader> {
        match self.input.take() {
            Some(input) => Ok(input),
            None => self
                .store
                .reader(&self.key)
                .await
                .map_err(|err| to_path_error(err, "read", &self.key)),
        }
    }

    /// Releases the read stream if one was opened. Closing twice, or
    /// without ever reading, succeeds.
    pub fn close(&mut self) -> Result<()> {
        self.input = None;
        Ok(())
    }
}

impl std::fmt::Debug for ObjectFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectFile")
            .field("key", &self.key)
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

/// Write-only handle over one object.
///
/// `read` always reports end-of-stream; the handle masquerades as
/// bidirectional only for interface symmetry.
pub struct ObjectWriter {
    name: String,
    key: String,
    store: Arc<dyn Bucket>,
    output: Option<ObjectSink>,
    wrote: bool,
}

impl ObjectWriter {
    pub(crate) fn new(store: Arc<dyn Bucket>, key: String, name: &str) -> Self {
        ObjectWriter {
            name: crate::path::base_name(name).to_string(),
            key,
            store,
            output: None,
            wrote: false,
        }
    }

    /// Base name of the object being written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes all of `buf`, opening the write stream on first use.
    pub async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut output = match self.output.take() {
            Some(output) => output,
            None => self
                .store
                .writer(&self.key)
                .await
                .map_err(|err| to_path_error(err, "write", &self.key))?,
        };
        self.wrote = true;
        output
            .write_all(buf)
            .await
            .map_err(|err| to_path_error(err.into(), "write", &self.key))?;
        self.output = Some(output);
        Ok(buf.len())
    }

    /// Always reads zero bytes.
    pub async fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Ok(0)
    }

    /// Finalizes the write stream exactly once; the object becomes visible
    /// here. A second close, or a close with no preceding write, succeeds
    /// without creating anything.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut output) = self.output.take() {
            output
                .shutdown()
                .await
                .map_err(|err| to_path_error(err.into(), "close", &self.key))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ObjectWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectWriter")
            .field("key", &self.key)
            .field("wrote", &self.wrote)
            .finish_non_exhaustive()
    }
}
