use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{cors, index_handler, redirect_handler, shorten_handler, static_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    /// Every path not routed here is looked up as a short code.
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/shorten", post(shorten_handler))
            .route("/statics/{*file}", get(static_handler))
            .fallback(redirect_handler)
            .layer(middleware::from_fn(cors))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
