use crate::error::BlobError;
use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;
use typed_builder::TypedBuilder;

/// Result type for blob backend operations.
pub type Result<T> = std::result::Result<T, BlobError>;

/// Version token of one blob's content.
///
/// Every successful write produces a new generation. Conditional writes
/// compare against the generation observed by an earlier read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Names one object inside a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobLocation {
    bucket: String,
    object: String,
}

impl BlobLocation {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn object(&self) -> &str {
        &self.object
    }
}

impl Display for BlobLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.object)
    }
}

/// An object as returned by [`BlobBackend::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobObject {
    pub data: Vec<u8>,
    pub generation: Generation,
    pub content_type: Option<String>,
}

/// Condition a write must satisfy to be applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePrecondition {
    /// Replace the object whatever its current state.
    #[default]
    None,
    /// Only create the object; fail if it already exists.
    DoesNotExist,
    /// Only replace the object if it is still at this generation.
    GenerationMatch(Generation),
}

impl WritePrecondition {
    /// The precondition that protects a read-modify-write cycle started from
    /// a read that observed `generation` (`None` when the object was missing).
    pub fn for_snapshot(generation: Option<Generation>) -> Self {
        match generation {
            Some(generation) => Self::GenerationMatch(generation),
            None => Self::DoesNotExist,
        }
    }

    /// Whether a write may proceed given the object's current generation.
    pub fn is_satisfied_by(&self, current: Option<Generation>) -> bool {
        match self {
            Self::None => true,
            Self::DoesNotExist => current.is_none(),
            Self::GenerationMatch(expected) => current == Some(*expected),
        }
    }

    /// Builds the error reported when this precondition does not hold.
    pub fn violation(&self, location: &BlobLocation, current: Option<Generation>) -> BlobError {
        let found = match current {
            Some(generation) => format!("generation {generation}"),
            None => "no object".to_string(),
        };
        BlobError::PreconditionFailed {
            location: location.to_string(),
            expected: self.to_string(),
            found,
        }
    }
}

impl Display for WritePrecondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("any state"),
            Self::DoesNotExist => f.write_str("no object"),
            Self::GenerationMatch(generation) => write!(f, "generation {generation}"),
        }
    }
}

/// Options attached to a [`BlobBackend::write`] call.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct WriteOptions {
    #[builder(default)]
    pub precondition: WritePrecondition,
    #[builder(default, setter(strip_option, into))]
    pub content_type: Option<String>,
}

/// Storage for opaque byte payloads addressed by bucket and object name.
///
/// This is the only I/O boundary to durable storage. Implementations must
/// replace an object's content atomically on each write and must evaluate
/// the write precondition atomically with the replacement.
#[async_trait]
pub trait BlobBackend: Send + Sync + 'static {
    /// Reads an object in full.
    ///
    /// Returns `Ok(None)` if the bucket exists but the object does not.
    async fn read(&self, location: &BlobLocation) -> Result<Option<BlobObject>>;

    /// Replaces an object's content and returns its new generation.
    ///
    /// Returns `Err(PreconditionFailed)` if `options.precondition` does not
    /// hold for the object's current state.
    async fn write(
        &self,
        location: &BlobLocation,
        data: Vec<u8>,
        options: WriteOptions,
    ) -> Result<Generation>;
}

#[async_trait]
impl<B: BlobBackend + ?Sized> BlobBackend for Arc<B> {
    async fn read(&self, location: &BlobLocation) -> Result<Option<BlobObject>> {
        (**self).read(location).await
    }

    async fn write(
        &self,
        location: &BlobLocation,
        data: Vec<u8>,
        options: WriteOptions,
    ) -> Result<Generation> {
        (**self).write(location, data, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_precondition() {
        assert_eq!(
            WritePrecondition::for_snapshot(None),
            WritePrecondition::DoesNotExist
        );
        assert_eq!(
            WritePrecondition::for_snapshot(Some(Generation::new(3))),
            WritePrecondition::GenerationMatch(Generation::new(3))
        );
    }

    #[test]
    fn precondition_evaluation() {
        let g1 = Some(Generation::new(1));
        let g2 = Some(Generation::new(2));

        assert!(WritePrecondition::None.is_satisfied_by(None));
        assert!(WritePrecondition::None.is_satisfied_by(g1));
        assert!(WritePrecondition::DoesNotExist.is_satisfied_by(None));
        assert!(!WritePrecondition::DoesNotExist.is_satisfied_by(g1));
        assert!(WritePrecondition::GenerationMatch(Generation::new(1)).is_satisfied_by(g1));
        assert!(!WritePrecondition::GenerationMatch(Generation::new(1)).is_satisfied_by(g2));
        assert!(!WritePrecondition::GenerationMatch(Generation::new(1)).is_satisfied_by(None));
    }

    #[test]
    fn violation_names_both_sides() {
        let location = BlobLocation::new("bucket", "records.json");
        let err = WritePrecondition::GenerationMatch(Generation::new(4))
            .violation(&location, Some(Generation::new(5)));

        assert_eq!(
            err.to_string(),
            "precondition failed for bucket/records.json: expected generation 4, found generation 5"
        );
    }

    #[test]
    fn write_options_builder_defaults() {
        let options = WriteOptions::builder().build();
        assert_eq!(options.precondition, WritePrecondition::None);
        assert!(options.content_type.is_none());

        let options = WriteOptions::builder()
            .precondition(WritePrecondition::DoesNotExist)
            .content_type("application/json")
            .build();
        assert_eq!(options.content_type.as_deref(), Some("application/json"));
    }
}
