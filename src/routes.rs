use crate::{
    handlers, // Import handlers module
    AppState, // Use the AppState defined in main.rs
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/bookmarks", get(handlers::bookmarks_page))
        .route("/posts/{id}/delete", post(handlers::delete_post))
        // Middleware Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state) // Pass the application state
}
