use pinhole_core::{BlobError, CodecError};
use std::fmt::Display;
use thiserror::Error;

/// Result type for mapping store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Which half of a read-modify-write cycle an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Read,
    Write,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Read => f.write_str("read"),
            Phase::Write => f.write_str("write"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record set {phase} failed: {source}")]
    Unavailable {
        phase: Phase,
        #[source]
        source: BlobError,
    },
    #[error("stored record set is malformed: {0}")]
    Decode(#[source] CodecError),
    #[error("record set could not be encoded: {0}")]
    Encode(#[source] CodecError),
    #[error("record set kept changing underneath us after {attempts} attempts")]
    Contended { attempts: usize },
    #[error("short code already taken: {0}")]
    CodeConflict(String),
    #[error("no free short code found up to length {max_length}")]
    CodeSpaceExhausted { max_length: usize },
}

impl StoreError {
    /// Whether the failure happened while looking at the current record set
    /// (as opposed to while trying to change it).
    pub fn phase(&self) -> Phase {
        match self {
            StoreError::Unavailable { phase, .. } => *phase,
            StoreError::Decode(_) => Phase::Read,
            StoreError::Encode(_)
            | StoreError::Contended { .. }
            | StoreError::CodeConflict(_)
            | StoreError::CodeSpaceExhausted { .. } => Phase::Write,
        }
    }

    pub(crate) fn read(source: BlobError) -> Self {
        StoreError::Unavailable {
            phase: Phase::Read,
            source,
        }
    }

    pub(crate) fn write(source: BlobError) -> Self {
        StoreError::Unavailable {
            phase: Phase::Write,
            source,
        }
    }
}

/// Errors surfaced by the [`Shortener`](crate::shortener::Shortener).
///
/// The display strings are the messages clients of the HTTP API see.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("failed to parse record")]
    Lookup(#[source] StoreError),
    #[error("failed to add new data to record")]
    Append(#[source] StoreError),
}

impl ShortenerError {
    /// The underlying store failure.
    pub fn store_error(&self) -> &StoreError {
        match self {
            ShortenerError::Lookup(source) | ShortenerError::Append(source) => source,
        }
    }
}

impl From<StoreError> for ShortenerError {
    fn from(value: StoreError) -> Self {
        match value.phase() {
            Phase::Read => ShortenerError::Lookup(value),
            Phase::Write => ShortenerError::Append(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_side_failures_become_lookup_errors() {
        let err: ShortenerError = StoreError::read(BlobError::Unavailable("down".into())).into();
        assert!(matches!(err, ShortenerError::Lookup(_)));
        assert_eq!(err.to_string(), "failed to parse record");

        let err: ShortenerError = StoreError::Decode(CodecError::Malformed("x".into())).into();
        assert!(matches!(err, ShortenerError::Lookup(_)));
    }

    #[test]
    fn write_side_failures_become_append_errors() {
        let err: ShortenerError = StoreError::write(BlobError::Unavailable("down".into())).into();
        assert!(matches!(err, ShortenerError::Append(_)));
        assert_eq!(err.to_string(), "failed to add new data to record");

        let err: ShortenerError = StoreError::Contended { attempts: 5 }.into();
        assert!(matches!(err, ShortenerError::Append(_)));
    }

    #[test]
    fn unavailable_names_phase() {
        let err = StoreError::read(BlobError::BucketNotFound("b".into()));
        assert_eq!(err.to_string(), "record set read failed: bucket not found: b");
    }
}
