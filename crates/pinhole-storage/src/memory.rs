use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use pinhole_core::blob::{BlobBackend, BlobLocation, BlobObject, Generation, Result, WriteOptions};
use pinhole_core::BlobError;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::trace;

/// In-memory storage entry for one object.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    generation: Generation,
    content_type: Option<String>,
}

/// In-memory implementation of the [`BlobBackend`] trait using DashMap.
///
/// Conditional writes go through the map's entry API, which holds the shard
/// lock between the precondition check and the replacement.
///
/// Buckets are created on first write unless the backend was built with
/// [`InMemoryBlobBackend::strict`], in which case only buckets declared via
/// [`InMemoryBlobBackend::with_bucket`] exist.
#[derive(Debug)]
pub struct InMemoryBlobBackend {
    objects: DashMap<BlobLocation, StoredObject>,
    buckets: DashSet<String>,
    auto_create_buckets: bool,
    next_generation: AtomicU64,
    failing_reads: AtomicUsize,
    failing_writes: AtomicUsize,
}

impl InMemoryBlobBackend {
    /// Creates a backend that creates buckets on demand.
    pub fn new() -> Self {
        Self::with_policy(true)
    }

    /// Creates a backend where reading or writing an undeclared bucket fails
    /// with [`BlobError::BucketNotFound`].
    pub fn strict() -> Self {
        Self::with_policy(false)
    }

    fn with_policy(auto_create_buckets: bool) -> Self {
        Self {
            objects: DashMap::new(),
            buckets: DashSet::new(),
            auto_create_buckets,
            next_generation: AtomicU64::new(1),
            failing_reads: AtomicUsize::new(0),
            failing_writes: AtomicUsize::new(0),
        }
    }

    /// Declares a bucket.
    pub fn with_bucket(self, bucket: impl Into<String>) -> Self {
        self.buckets.insert(bucket.into());
        self
    }

    /// Makes the next `count` reads fail with [`BlobError::Unavailable`].
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    /// Makes the next `count` writes fail with [`BlobError::Unavailable`].
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of objects across all buckets.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn bump_generation(&self) -> Generation {
        Generation::new(self.next_generation.fetch_add(1, Ordering::SeqCst))
    }

    fn check_bucket(&self, location: &BlobLocation, create: bool) -> Result<()> {
        if self.buckets.contains(location.bucket()) {
            return Ok(());
        }
        if self.auto_create_buckets {
            if create {
                self.buckets.insert(location.bucket().to_owned());
            }
            return Ok(());
        }
        Err(BlobError::BucketNotFound(location.bucket().to_owned()))
    }
}

impl Default for InMemoryBlobBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumes one injected failure, if any are pending.
fn take_fault(counter: &AtomicUsize, operation: &str, location: &BlobLocation) -> Result<()> {
    let injected = counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if injected {
        return Err(BlobError::Unavailable(format!(
            "injected {operation} failure for {location}"
        )));
    }
    Ok(())
}

#[async_trait]
impl BlobBackend for InMemoryBlobBackend {
    async fn read(&self, location: &BlobLocation) -> Result<Option<BlobObject>> {
        take_fault(&self.failing_reads, "read", location)?;
        self.check_bucket(location, false)?;

        let Some(entry) = self.objects.get(location) else {
            trace!(%location, "object not found");
            return Ok(None);
        };

        let stored = entry.value();
        Ok(Some(BlobObject {
            data: stored.data.clone(),
            generation: stored.generation,
            content_type: stored.content_type.clone(),
        }))
    }

    async fn write(
        &self,
        location: &BlobLocation,
        data: Vec<u8>,
        options: WriteOptions,
    ) -> Result<Generation> {
        take_fault(&self.failing_writes, "write", location)?;
        self.check_bucket(location, true)?;

        let precondition = options.precondition;
        match self.objects.entry(location.clone()) {
            Entry::Occupied(mut occupied) => {
                let current = occupied.get().generation;
                if !precondition.is_satisfied_by(Some(current)) {
                    return Err(precondition.violation(location, Some(current)));
                }
                let generation = self.bump_generation();
                occupied.insert(StoredObject {
                    data,
                    generation,
                    content_type: options.content_type,
                });
                trace!(%location, %generation, "object replaced");
                Ok(generation)
            }
            Entry::Vacant(vacant) => {
                if !precondition.is_satisfied_by(None) {
                    return Err(precondition.violation(location, None));
                }
                let generation = self.bump_generation();
                vacant.insert(StoredObject {
                    data,
                    generation,
                    content_type: options.content_type,
                });
                trace!(%location, %generation, "object created");
                Ok(generation)
            }
        }
    }
}
