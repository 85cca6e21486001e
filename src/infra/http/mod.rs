pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use state::ApiState;

use axum::{Router, middleware as axum_middleware, routing::get};

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/documents/{repository_id}",
            get(handlers::list_documents),
        )
        .route(
            "/api/documents/types/{repository_id}",
            get(handlers::list_document_types),
        )
        .route("/api/slices/{repository_id}", get(handlers::list_slices))
        .route(
            "/api/repositories",
            get(handlers::list_repositories).post(handlers::add_repository),
        )
        .route("/healthz", get(handlers::health))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
}
