use crate::model::ShortenResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pinhole_core::BlobError;
use pinhole_shortener::ShortenerError;
use thiserror::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures of the `/shorten` endpoint, rendered as a [`ShortenResponse`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to decode post body")]
    InvalidBody,
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidBody => warn!("rejected undecodable shorten request"),
            AppError::Shortener(e) => warn!(error = %e.store_error(), "{e}"),
        }
        (
            StatusCode::BAD_REQUEST,
            Json(ShortenResponse::failure(self.to_string())),
        )
            .into_response()
    }
}

/// Failures serving a static asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("File not found or content-type not be supported {0}")]
    Unsupported(String),
    #[error("File not found {0}")]
    NotFound(String),
    #[error("Unable to read file {path}")]
    Unreadable {
        path: String,
        #[source]
        source: BlobError,
    },
}

impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        match &self {
            AssetError::Unsupported(_) => (
                StatusCode::NOT_FOUND,
                Json(ShortenResponse::failure(self.to_string())),
            )
                .into_response(),
            AssetError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            AssetError::Unreadable { source, .. } => {
                warn!(error = %source, "{self}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}
