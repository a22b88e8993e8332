pub mod error;
mod grants;
mod validation;

#[cfg(test)]
mod tests;

pub use grants::{DeleteQuery, GrantAction, GrantsQuery, UpdateTarget};

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Grants and funding
        .route("/grants", get(grants::get_grants))
        .route("/grants", post(grants::post_grants))
        .route("/grants", patch(grants::patch_grants))
        .route("/grants", delete(grants::delete_grants));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
