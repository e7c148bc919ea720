//! Derives the five CRUD routes of a [`ResourceService`] and registers them.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use orgdesk_infra::storage::Filter;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::bind::{BindError, Transport};
use super::envelope::{Envelope, ServiceResult};
use super::error::ServiceError;
use super::operation::Operation;
use super::service::ResourceService;

/// One registered route, as reported by [`route_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub name: String,
    pub resource: &'static str,
    pub operation: Operation,
    pub path: String,
}

impl RouteInfo {
    /// Placeholder names in path order, e.g. `["org", "tag"]`.
    pub fn params(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix(':'))
            .collect()
    }
}

fn group_path(service: &impl ResourceService) -> String {
    format!("/{}", service.name().trim_matches('/'))
}

fn item_path(group: &str, params: &[&str]) -> String {
    params
        .iter()
        .fold(group.to_string(), |path, param| format!("{path}/:{param}"))
}

/// Routes `mount` registers for `service`, in registration order.
pub fn route_table<S: ResourceService>(service: &S) -> Vec<RouteInfo> {
    let group = group_path(service);
    let params = service.path_params();
    let item = item_path(&group, params);
    let first = params.first().copied().unwrap_or_else(|| service.name());

    Operation::ALL
        .into_iter()
        .filter(|op| !op.targets_item() || !params.is_empty())
        .map(|op| RouteInfo {
            name: op.route_name(first),
            resource: service.name(),
            operation: op,
            path: if op.targets_item() { item.clone() } else { group.clone() },
        })
        .collect()
}

/// Register create/list on `/{name}` and get/update/delete on
/// `/{name}/:param...`, then merge them into `router`.
pub fn mount<S: ResourceService>(router: Router, service: Arc<S>) -> Router {
    let group = group_path(&*service);
    let params = service.path_params();

    let mut routes = Router::new().route(&group, post(create::<S>).get(list::<S>));
    if params.is_empty() {
        warn!(resource = service.name(), "no path params; item routes not mounted");
    } else {
        let item = item_path(&group, params);
        routes = routes.route(&item, get(fetch::<S>).patch(update::<S>).delete(delete::<S>));
    }

    debug!(resource = service.name(), path = %group, "mounted resource");
    router.merge(routes.with_state(service))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

fn bind_failure(resource: &str, op: Operation, err: BindError) -> Response {
    warn!(resource, error = %err, "{op}-bind-error");
    Envelope::error(op.bind_failure_status(), err.0).into_response()
}

fn respond(resource: &str, op: Operation, result: ServiceResult) -> Response {
    match result {
        Ok(envelope) => envelope.into_response(),
        Err(err) => {
            log_failure(resource, op, &err);
            err.into_envelope().into_response()
        }
    }
}

fn log_failure(resource: &str, op: Operation, err: &ServiceError) {
    if err.status().is_server_error() {
        error!(resource, op = %op, error = %err, "service call failed");
    } else {
        debug!(resource, op = %op, error = %err, "service call rejected");
    }
}

async fn create<S: ResourceService>(
    State(service): State<Arc<S>>,
    transport: Transport,
) -> Response {
    let op = Operation::Create;
    match transport.bind(op) {
        Ok(req) => respond(service.name(), op, service.create(req).await),
        Err(err) => bind_failure(service.name(), op, err),
    }
}

async fn fetch<S: ResourceService>(
    State(service): State<Arc<S>>,
    transport: Transport,
) -> Response {
    let op = Operation::Get;
    match transport.bind(op) {
        Ok(req) => respond(service.name(), op, service.get(req).await),
        Err(err) => bind_failure(service.name(), op, err),
    }
}

async fn list<S: ResourceService>(
    State(service): State<Arc<S>>,
    transport: Transport,
) -> Response {
    let op = Operation::List;
    let bound = transport.bind::<S::List>(op).and_then(|req| {
        let filter = Filter::from_query(transport.query_pairs()?.iter().cloned());
        Ok((req, filter))
    });
    match bound {
        Ok((req, filter)) => respond(service.name(), op, service.list(req, filter).await),
        Err(err) => bind_failure(service.name(), op, err),
    }
}

async fn update<S: ResourceService>(
    State(service): State<Arc<S>>,
    transport: Transport,
) -> Response {
    let op = Operation::Update;
    match transport.bind(op) {
        Ok(req) => respond(service.name(), op, service.update(req).await),
        Err(err) => bind_failure(service.name(), op, err),
    }
}

/// 204 on success, 500 with an empty body on any service error.
async fn delete<S: ResourceService>(
    State(service): State<Arc<S>>,
    transport: Transport,
) -> Response {
    let op = Operation::Delete;
    let req = match transport.bind(op) {
        Ok(req) => req,
        Err(err) => return bind_failure(service.name(), op, err),
    };
    match service.delete(req).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            log_failure(service.name(), op, &err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulates mounted services together with their route table.
pub struct ServiceRouter {
    router: Router,
    routes: Vec<RouteInfo>,
}

impl ServiceRouter {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            routes: Vec::new(),
        }
    }

    pub fn mount<S: ResourceService>(mut self, service: Arc<S>) -> Self {
        self.routes.extend(route_table(&*service));
        self.router = mount(self.router, service);
        self
    }

    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    pub fn into_parts(self) -> (Router, Vec<RouteInfo>) {
        (self.router, self.routes)
    }
}

impl Default for ServiceRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::Request as BoundRequest;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde::Deserialize;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Item {
        #[serde(default)]
        shelf: String,
        #[serde(default)]
        item: String,
        #[serde(default)]
        label: Option<String>,
    }

    impl BoundRequest for Item {
        fn id(&self) -> Option<&str> {
            Some(&self.item)
        }
    }

    /// Echoes what it was given; ids starting with `missing` are not found.
    struct Shelf;

    #[async_trait]
    impl ResourceService for Shelf {
        type Create = Item;
        type Get = Item;
        type List = Item;
        type Update = Item;
        type Delete = Item;

        fn name(&self) -> &'static str {
            "shelf/:shelf/item"
        }

        fn path_params(&self) -> &'static [&'static str] {
            &["item"]
        }

        async fn create(&self, req: Item) -> ServiceResult {
            Envelope::ok(json!({"shelf": req.shelf, "label": req.label}))
        }

        async fn get(&self, req: Item) -> ServiceResult {
            match req.id() {
                Some("explode") => panic!("shelf item exploded"),
                Some(id) if id.starts_with("missing") => Err(ServiceError::NotFound),
                id => Envelope::ok(json!({"item": id})),
            }
        }

        async fn list(&self, req: Item, filter: Filter) -> ServiceResult {
            Envelope::ok(json!({"shelf": req.shelf, "label": filter.term("label")}))
        }

        async fn update(&self, req: Item) -> ServiceResult {
            Envelope::ok(json!({"item": req.item, "label": req.label}))
        }

        async fn delete(&self, req: Item) -> Result<(), ServiceError> {
            if req.item == "broken" {
                Err(ServiceError::Persistence("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    fn app() -> Router {
        mount(Router::new(), Arc::new(Shelf))
    }

    async fn call(method: &str, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        send(app(), method, uri, body).await
    }

    async fn send(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = router.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json_of(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn create_binds_parent_from_path() {
        let (status, body) = call("POST", "/shelf/s1/item", r#"{"shelf":"spoof","label":"red"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_of(&body),
            json!({"status": 200, "errors": null, "data": {"shelf": "s1", "label": "red"}})
        );
    }

    #[tokio::test]
    async fn list_receives_query_filter() {
        let (status, body) = call("GET", "/shelf/s1/item?label=blue", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["data"], json!({"shelf": "s1", "label": "blue"}));
    }

    #[tokio::test]
    async fn http_status_mirrors_envelope() {
        let (status, body) = call("GET", "/shelf/s1/item/missing-1", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json_of(&body),
            json!({"status": 404, "errors": ["record not found"], "data": null})
        );
    }

    #[tokio::test]
    async fn bind_failure_statuses() {
        let (status, body) = call("POST", "/shelf/s1/item", "{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(&body)["status"], 500);

        let (status, body) = call("PATCH", "/shelf/s1/item/i1", "[]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_of(&body)["data"].is_null());
    }

    #[tokio::test]
    async fn panicking_service_is_a_500_and_router_keeps_serving() {
        let router = crate::app::with_middleware(app());

        let (status, _) = send(router.clone(), "GET", "/shelf/s1/item/explode", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = send(router, "GET", "/shelf/s1/item/i1", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["data"], json!({"item": "i1"}));
    }

    #[tokio::test]
    async fn delete_has_empty_bodies() {
        let (status, body) = call("DELETE", "/shelf/s1/item/i1", "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());

        let (status, body) = call("DELETE", "/shelf/s1/item/broken", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
    }

    #[test]
    fn route_table_names_and_paths() {
        let routes = route_table(&Shelf);
        let summary: Vec<(String, String)> =
            routes.iter().map(|r| (r.name.clone(), r.path.clone())).collect();
        assert_eq!(
            summary,
            vec![
                ("item-create".to_string(), "/shelf/:shelf/item".to_string()),
                ("item-list".to_string(), "/shelf/:shelf/item".to_string()),
                ("item-get".to_string(), "/shelf/:shelf/item/:item".to_string()),
                ("item-update".to_string(), "/shelf/:shelf/item/:item".to_string()),
                ("item-delete".to_string(), "/shelf/:shelf/item/:item".to_string()),
            ]
        );
        assert_eq!(routes[2].params(), vec!["shelf", "item"]);
    }
}
