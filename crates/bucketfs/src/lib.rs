//! A filesystem view over a flat object store.
//!
//! Object stores have no directories, only keys. This crate emulates a
//! hierarchical, read-mostly filesystem on top of one bucket: `/`-separated
//! keys are treated as paths, directories are synthesized from key prefixes
//! via delimiter listings, and familiar operations (`open`, `stat`,
//! `read_dir`, `glob`, writers) are layered on the narrow [`Bucket`]
//! capability trait.
//!
//! ```no_run
//! use bucketfs::BucketFs;
//!
//! # async fn demo() -> bucketfs::Result<()> {
//! let fs = BucketFs::gcs("my-bucket").map_err(|err| {
//!     bucketfs::to_path_error(err, "connect", "my-bucket")
//! })?;
//! for entry in fs.read_dir("reports/2026").await? {
//!     println!("{} ({} bytes)", entry.name(), entry.size());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Directories have no persisted representation: one exists exactly when at
//! least one object lives under its prefix, `mkdir` is a no-op, and writing
//! an object brings every ancestor directory into existence at once.

mod diagnostics;
mod dir;
mod entry;
mod error;
mod file;
mod fs;
mod glob;
mod path;
pub mod store;

pub use diagnostics::init_diagnostics;
pub use dir::ObjectDir;
pub use entry::Entry;
pub use error::{Error, Result, StoreError, StoreResult, to_path_error, to_store_not_found};
pub use file::{ObjectFile, ObjectWriter};
pub use fs::{BucketFs, DEFAULT_DIR_OPEN_BUFFER_SIZE, Node};
pub use store::{Bucket, MemoryBucket, ObjectAttrs, Query, RemoteBucket};
