use crate::state::AppState;
use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use pinhole_core::ShortCode;
use tracing::{debug, warn};

const MISS_MESSAGE: &str = "Corresponding origin URL could not be found ";

/// Treats the whole request path, minus its leading `/`, as a short code and
/// redirects to its origin.
///
/// Resolution failures are answered with 200 and the error text; unknown
/// codes with the configured miss status.
pub async fn redirect_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path().strip_prefix('/').unwrap_or(uri.path());
    // Stored codes are matched verbatim, whatever their shape, after the
    // path's percent-encoding is undone. Undecodable paths are kept raw.
    let code = ShortCode::new_unchecked(urlencoding::decode(path).unwrap_or(path.into()));

    match state.shortener().resolve(&code).await {
        Ok(Some(origin)) => match HeaderValue::try_from(origin.as_str()) {
            Ok(location) => {
                debug!(%code, %origin, "redirecting");
                (StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response()
            }
            Err(e) => {
                warn!(%code, %origin, error = %e, "stored origin is not a valid location");
                format!("invalid origin URL {origin}").into_response()
            }
        },
        Ok(None) => {
            debug!(%code, "short code not found");
            miss(&state)
        }
        Err(e) => {
            let message = e.store_error().to_string();
            warn!(%code, error = %message, "failed to resolve short code");
            message.into_response()
        }
    }
}

fn miss(state: &AppState) -> Response {
    (state.miss_status().status_code(), MISS_MESSAGE).into_response()
}
