use crate::error::ShortenerError;
use crate::origin::OriginParts;
use async_trait::async_trait;
use pinhole_core::ShortCode;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the short code for the origin assembled from `parts`,
    /// assigning a new one if the origin has not been shortened before.
    async fn shorten(&self, parts: &OriginParts) -> Result<ShortCode, ShortenerError>;

    /// Retrieves the origin URL associated with the given short code.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>, ShortenerError>;
}
