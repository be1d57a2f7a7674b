//! Blob backend adapters.
//!
//! [`InMemoryBlobBackend`] keeps objects in process memory and is what tests
//! and local runs use. [`FsBlobBackend`] maps buckets to directories on a
//! local or mounted filesystem.

pub mod fs;
pub mod memory;

pub use fs::FsBlobBackend;
pub use memory::InMemoryBlobBackend;
pub use pinhole_core::blob::{BlobBackend, BlobLocation, BlobObject, Generation, WriteOptions, WritePrecondition};
pub use pinhole_core::BlobError;
