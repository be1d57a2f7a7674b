use thiserror::Error;

/// Errors related to the core types of the URL shortener service.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors returned by [`BlobBackend`](crate::blob::BlobBackend) implementations.
#[derive(Debug, Clone, Error)]
pub enum BlobError {
    #[error("bucket not found: {0}")]
    BucketNotFound(String),
    #[error("precondition failed for {location}: expected {expected}, found {found}")]
    PreconditionFailed {
        location: String,
        expected: String,
        found: String,
    },
    #[error("blob backend unavailable: {0}")]
    Unavailable(String),
    #[error("blob i/o failed: {0}")]
    Io(String),
    #[error("blob operation failed: {0}")]
    Operation(String),
}

impl From<std::io::Error> for BlobError {
    fn from(value: std::io::Error) -> Self {
        BlobError::Io(value.to_string())
    }
}

/// Errors produced while encoding or decoding a record set.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("record set is malformed: {0}")]
    Malformed(String),
    #[error("record set could not be serialized: {0}")]
    Serialize(String),
}
