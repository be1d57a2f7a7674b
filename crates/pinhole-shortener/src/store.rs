use crate::error::{Result, StoreError};
use pinhole_core::blob::{BlobBackend, BlobLocation, Generation, WriteOptions, WritePrecondition};
use pinhole_core::{codec, BlobError, MappingRecord, RecordSet, ShortCode};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Content type recorded on the record set blob.
pub const RECORD_CONTENT_TYPE: &str = "application/json";

const DEFAULT_MAX_WRITE_ATTEMPTS: usize = 5;

/// Where the record set lives and how hard to try when writing it.
#[derive(Debug, Clone, TypedBuilder)]
pub struct StoreConfig {
    /// The blob holding the full record set.
    pub location: BlobLocation,
    /// Number of read-modify-write cycles attempted before giving up when
    /// another writer keeps changing the blob.
    #[builder(default = DEFAULT_MAX_WRITE_ATTEMPTS)]
    pub max_write_attempts: usize,
}

/// A record set together with the generation it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub records: RecordSet,
    /// `None` when the blob did not exist yet.
    pub generation: Option<Generation>,
}

/// Outcome of [`MappingStore::find_or_insert_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assigned {
    /// The origin already had this code.
    Existing(ShortCode),
    /// A new record was appended.
    Created(MappingRecord),
}

enum Mutation<T> {
    Unchanged(T),
    Changed(T),
}

/// Owns the record set blob and keeps it consistent.
///
/// Nothing is cached: every operation reads the blob in full, and every
/// mutation writes the full updated set back. Mutations are serialized
/// behind a writer lock within this process, and each write-back is
/// conditional on the generation the cycle started from so that writers in
/// other processes cannot silently clobber each other. A cycle that loses
/// such a race is replayed from a fresh read.
#[derive(Debug)]
pub struct MappingStore<B> {
    backend: B,
    config: StoreConfig,
    writer: Mutex<()>,
}

impl<B: BlobBackend> MappingStore<B> {
    pub fn new(backend: B, config: StoreConfig) -> Self {
        Self {
            backend,
            config,
            writer: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn location(&self) -> &BlobLocation {
        &self.config.location
    }

    /// Reads and decodes the current record set.
    ///
    /// A missing blob is an empty record set.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let location = &self.config.location;
        let object = self
            .backend
            .read(location)
            .await
            .map_err(StoreError::read)?;

        let Some(object) = object else {
            trace!(%location, "record set blob missing, treating as empty");
            return Ok(Snapshot {
                records: RecordSet::new(),
                generation: None,
            });
        };

        let records = codec::decode(&object.data).map_err(StoreError::Decode)?;
        trace!(%location, generation = %object.generation, records = records.len(), "read record set");
        Ok(Snapshot {
            records,
            generation: Some(object.generation),
        })
    }

    /// Returns the code of the first record whose origin equals `origin`.
    pub async fn find_code_by_origin(&self, origin: &str) -> Result<Option<ShortCode>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .records
            .find_by_origin(origin)
            .map(|record| record.code.clone()))
    }

    /// Returns the origin of the first record whose code equals `code`.
    pub async fn find_origin_by_code(&self, code: &ShortCode) -> Result<Option<String>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .records
            .find_by_code(code)
            .map(|record| record.origin.clone()))
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.snapshot().await?.records.len())
    }

    /// Appends `record` to the stored set.
    ///
    /// Returns `Err(CodeConflict)` if its code is already taken.
    pub async fn append(&self, record: MappingRecord) -> Result<()> {
        self.mutate(|records| {
            if records.contains_code(&record.code) {
                return Err(StoreError::CodeConflict(record.code.to_string()));
            }
            records.push(record.clone());
            Ok(Mutation::Changed(()))
        })
        .await
    }

    /// Returns the code already assigned to `origin`, or appends a new record
    /// for it with a code produced by `make_code`.
    ///
    /// The lookup and the append happen within one mutation cycle, so two
    /// concurrent calls for the same new origin yield a single record.
    /// `make_code` sees the record set the new code must not collide with;
    /// it may be called again if the cycle is replayed.
    pub async fn find_or_insert_with<F>(&self, origin: &str, mut make_code: F) -> Result<Assigned>
    where
        F: FnMut(&RecordSet) -> Result<ShortCode> + Send,
    {
        self.mutate(|records| {
            if let Some(existing) = records.find_by_origin(origin) {
                return Ok(Mutation::Unchanged(Assigned::Existing(existing.code.clone())));
            }

            let code = make_code(records)?;
            if records.contains_code(&code) {
                return Err(StoreError::CodeConflict(code.to_string()));
            }

            let record = MappingRecord::new(origin, code);
            records.push(record.clone());
            Ok(Mutation::Changed(Assigned::Created(record)))
        })
        .await
    }

    async fn mutate<T, F>(&self, mut apply: F) -> Result<T>
    where
        F: FnMut(&mut RecordSet) -> Result<Mutation<T>> + Send,
        T: Send,
    {
        let _guard = self.writer.lock().await;
        let location = &self.config.location;
        let attempts = self.config.max_write_attempts.max(1);

        for attempt in 1..=attempts {
            let Snapshot {
                mut records,
                generation,
            } = self.snapshot().await?;

            let value = match apply(&mut records)? {
                Mutation::Unchanged(value) => return Ok(value),
                Mutation::Changed(value) => value,
            };

            let data = codec::encode(&records).map_err(StoreError::Encode)?;
            let options = WriteOptions::builder()
                .precondition(WritePrecondition::for_snapshot(generation))
                .content_type(RECORD_CONTENT_TYPE)
                .build();

            match self.backend.write(location, data, options).await {
                Ok(new_generation) => {
                    debug!(%location, generation = %new_generation, records = records.len(), "wrote record set");
                    return Ok(value);
                }
                Err(BlobError::PreconditionFailed { .. }) => {
                    warn!(%location, attempt, "record set changed concurrently, retrying");
                }
                Err(e) => return Err(StoreError::write(e)),
            }
        }

        Err(StoreError::Contended { attempts })
    }
}
