use crate::error::{ShortenerError, StoreError};
use crate::origin::OriginParts;
use crate::shortener::Shortener;
use crate::store::{Assigned, MappingStore};
use async_trait::async_trait;
use pinhole_core::shortcode::{DEFAULT_LENGTH, MAX_LENGTH};
use pinhole_core::{BlobBackend, RecordSet, ShortCode};
use pinhole_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use typed_builder::TypedBuilder;

const DEFAULT_ATTEMPTS_PER_LENGTH: usize = 8;
const DEFAULT_MAX_CODE_LENGTH: usize = 10;

/// How new short codes are picked.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Length of freshly generated codes.
    #[builder(default = DEFAULT_LENGTH)]
    pub code_length: usize,
    /// Candidates drawn at one length before moving to the next.
    #[builder(default = DEFAULT_ATTEMPTS_PER_LENGTH)]
    pub attempts_per_length: usize,
    /// Longest code tried before giving up.
    #[builder(default = DEFAULT_MAX_CODE_LENGTH)]
    pub max_code_length: usize,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The [`Shortener`] backed by a [`MappingStore`].
///
/// Shortening an origin that is already stored returns its existing code.
/// Otherwise candidates are drawn from the generator and checked against the
/// record set; after `attempts_per_length` collisions the code length grows
/// by one, up to `max_code_length`.
#[derive(Debug, Clone)]
pub struct ShortenerService<B, G> {
    store: Arc<MappingStore<B>>,
    generator: Arc<G>,
    settings: ShortenerSettings,
}

impl<B: BlobBackend, G: Generator> ShortenerService<B, G> {
    pub fn new(store: MappingStore<B>, generator: G) -> Self {
        Self::with_settings(store, generator, ShortenerSettings::default())
    }

    pub fn with_settings(store: MappingStore<B>, generator: G, settings: ShortenerSettings) -> Self {
        let code_length = settings.code_length.clamp(1, MAX_LENGTH);
        let settings = ShortenerSettings {
            code_length,
            attempts_per_length: settings.attempts_per_length.max(1),
            max_code_length: settings.max_code_length.clamp(code_length, MAX_LENGTH),
        };
        Self {
            store: Arc::new(store),
            generator: Arc::new(generator),
            settings,
        }
    }

    pub fn store(&self) -> &MappingStore<B> {
        &self.store
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    /// Returns the code for `origin`, appending a new record if needed.
    #[instrument(skip(self))]
    pub async fn shorten_origin(&self, origin: &str) -> Result<ShortCode, ShortenerError> {
        let assigned = self
            .store
            .find_or_insert_with(origin, |records| self.next_free_code(records))
            .await?;

        match assigned {
            Assigned::Existing(code) => {
                debug!(%code, "origin already shortened");
                Ok(code)
            }
            Assigned::Created(record) => {
                info!(code = %record.code, "created mapping");
                Ok(record.code)
            }
        }
    }

    fn next_free_code(&self, records: &RecordSet) -> Result<ShortCode, StoreError> {
        let ShortenerSettings {
            code_length,
            attempts_per_length,
            max_code_length,
        } = self.settings;

        for length in code_length..=max_code_length {
            for _ in 0..attempts_per_length {
                let candidate: ShortCode = self.generator.generate(length).into();
                if !records.contains_code(&candidate) {
                    return Ok(candidate);
                }
                debug!(%candidate, "short code collision");
            }
            warn!(length, "no free short code at this length, growing");
        }

        Err(StoreError::CodeSpaceExhausted {
            max_length: max_code_length,
        })
    }
}

#[async_trait]
impl<B: BlobBackend, G: Generator> Shortener for ShortenerService<B, G> {
    async fn shorten(&self, parts: &OriginParts) -> Result<ShortCode, ShortenerError> {
        self.shorten_origin(&parts.to_origin()).await
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>, ShortenerError> {
        self.store
            .find_origin_by_code(code)
            .await
            .map_err(ShortenerError::Lookup)
    }
}
