use axum::http::StatusCode;
use pinhole_core::BlobBackend;
use pinhole_shortener::Shortener;
use std::sync::Arc;

/// Object prefix static assets are served from.
pub const STATICS_PREFIX: &str = "statics";

/// Status returned when a short code has no mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissStatus {
    /// 200 with an explanatory body.
    #[default]
    Ok,
    /// 404 with the same body.
    NotFound,
}

impl MissStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            MissStatus::Ok => StatusCode::OK,
            MissStatus::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    assets: Arc<dyn BlobBackend>,
    asset_bucket: String,
    miss_status: MissStatus,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        assets: Arc<dyn BlobBackend>,
        asset_bucket: impl Into<String>,
    ) -> Self {
        Self {
            shortener,
            assets,
            asset_bucket: asset_bucket.into(),
            miss_status: MissStatus::default(),
        }
    }

    pub fn with_miss_status(mut self, miss_status: MissStatus) -> Self {
        self.miss_status = miss_status;
        self
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn assets(&self) -> &dyn BlobBackend {
        self.assets.as_ref()
    }

    pub fn asset_bucket(&self) -> &str {
        &self.asset_bucket
    }

    pub fn miss_status(&self) -> MissStatus {
        self.miss_status
    }
}
