use axum::{Router, routing::get};

pub mod system;

/// Routes served outside the generic resource mounts.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::hello))
        .route("/health", get(system::health))
        .route("/user/types", get(system::list_user_types))
}
