pub mod dto;
pub mod middleware;
pub mod routes;
pub mod sse;

use std::sync::Arc;

use axum::Router;

// Re-export for convenience
pub use crate::infrastructure::app_state::AppState;

/// Application router with every endpoint mounted under `/api`
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", routes::create_api_router(state.clone()))
        .with_state(state)
}
