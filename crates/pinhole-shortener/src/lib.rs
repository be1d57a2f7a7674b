//! URL shortener service implementation.
//!
//! Mappings live in a single record set blob owned by the [`MappingStore`];
//! the [`ShortenerService`] assigns codes on top of it.

pub mod error;
pub mod origin;
pub mod service;
pub mod shortener;
pub mod store;

pub use error::{Phase, ShortenerError, StoreError};
pub use origin::OriginParts;
pub use service::{ShortenerService, ShortenerSettings};
pub use shortener::Shortener;
pub use store::{Assigned, MappingStore, Snapshot, StoreConfig};
