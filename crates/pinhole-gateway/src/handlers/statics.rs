use crate::error::AssetError;
use crate::state::{AppState, STATICS_PREFIX};
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use pinhole_core::BlobLocation;
use tracing::trace;

const INDEX_FILE: &str = "index.html";

pub async fn index_handler(State(state): State<AppState>) -> Result<Response, AssetError> {
    serve(&state, INDEX_FILE, "text/html; charset=utf-8").await
}

/// Serves `statics/{file}` for `.js` and `.css` files.
pub async fn static_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AssetError> {
    let Some(content_type) = content_type_for(&file) else {
        return Err(AssetError::Unsupported(format!("/{STATICS_PREFIX}/{file}")));
    };
    serve(&state, &file, content_type).await
}

fn content_type_for(file: &str) -> Option<&'static str> {
    match file.rsplit_once('.') {
        Some((stem, "js")) if !stem.is_empty() => Some("application/javascript"),
        Some((stem, "css")) if !stem.is_empty() => Some("text/css"),
        _ => None,
    }
}

async fn serve(state: &AppState, file: &str, content_type: &'static str) -> Result<Response, AssetError> {
    let path = format!("{STATICS_PREFIX}/{file}");
    let location = BlobLocation::new(state.asset_bucket(), &path);

    let object = state
        .assets()
        .read(&location)
        .await
        .map_err(|source| AssetError::Unreadable {
            path: path.clone(),
            source,
        })?
        .ok_or_else(|| AssetError::NotFound(path.clone()))?;

    trace!(%location, bytes = object.data.len(), "serving asset");
    Ok(([(CONTENT_TYPE, content_type)], object.data).into_response())
}
