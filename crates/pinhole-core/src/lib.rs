//! Core types and traits for the Pinhole URL shortener.
//!
//! This crate provides the shared vocabulary of the workspace: short codes,
//! mapping records, the record set codec and the blob backend contract that
//! every storage adapter implements.

pub mod blob;
pub mod codec;
pub mod error;
pub mod record;
pub mod shortcode;

pub use blob::{BlobBackend, BlobLocation, BlobObject, Generation, WriteOptions, WritePrecondition};
pub use error::{BlobError, CodecError, CoreError};
pub use record::{MappingRecord, RecordSet};
pub use shortcode::ShortCode;
