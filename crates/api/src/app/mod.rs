//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend selection, migrations, service handles
//! - `resources/`: organization, user and tag services mounted generically
//! - `routes/`: the few hand-written routes
//! - `docs.rs`: OpenAPI document built from the route table, plus its Swagger UI page

use std::sync::Arc;

use axum::{Json, Router, response::Html, routing::get};
use orgdesk_infra::storage::Storer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::generic::ServiceRouter;

pub mod docs;
pub mod resources;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router on top of an already migrated store.
pub fn build_app(store: Arc<dyn Storer>) -> Router {
    let services = AppServices::new(store);

    let (resources, route_table) = ServiceRouter::new()
        .mount(services.organizations)
        .mount(services.users)
        .mount(services.tags)
        .into_parts();

    for route in &route_table {
        debug!(name = %route.name, method = %route.operation.method(), path = %route.path, "route");
    }
    let openapi = docs::openapi(&route_table);

    let router = Router::new()
        .merge(routes::router())
        .merge(resources)
        .route(docs::DOCS_PATH, get(move || async move { Json(openapi) }))
        .route(docs::UI_PATH, get(|| async { Html(docs::swagger_ui()) }));

    with_middleware(router)
}

/// Request tracing plus panic recovery; a panicking handler becomes a 500.
pub fn with_middleware(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::new()),
    )
}
