//! OpenAPI 3 document derived from the mounted route table.

use serde_json::{Map, Value, json};

use crate::generic::{Operation, RouteInfo};

pub const DOCS_PATH: &str = "/docs/openapi.json";
pub const UI_PATH: &str = "/swagger";

const SWAGGER_UI_CDN: &str = "https://unpkg.com/swagger-ui-dist@5";

/// Swagger UI page rendering the document served at [`DOCS_PATH`].
pub fn swagger_ui() -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<title>orgdesk API</title>
<link rel="stylesheet" href="{SWAGGER_UI_CDN}/swagger-ui.css">
</head>
<body>
<div id="swagger-ui"></div>
<script src="{SWAGGER_UI_CDN}/swagger-ui-bundle.js"></script>
<script>SwaggerUIBundle({{ url: "{DOCS_PATH}", dom_id: "#swagger-ui" }});</script>
</body>
</html>
"##
    )
}

/// `/organization/:org/user` -> `/organization/{org}/user`
fn openapi_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(param) => format!("{{{param}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn envelope_ref(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Envelope"}}}
    })
}

fn responses(op: Operation) -> Value {
    match op {
        Operation::Delete => json!({
            "204": {"description": "Deleted (or nothing matched)"},
            "400": envelope_ref("Bad Request"),
            "500": {"description": "Internal Server Error"}
        }),
        Operation::Get | Operation::Update => json!({
            "200": envelope_ref("OK"),
            "400": envelope_ref("Bad Request"),
            "404": envelope_ref("Not Found"),
            "500": envelope_ref("Internal Server Error")
        }),
        Operation::Create | Operation::List => json!({
            "200": envelope_ref("OK"),
            "400": envelope_ref("Bad Request"),
            "500": envelope_ref("Internal Server Error")
        }),
    }
}

fn operation(route: &RouteInfo) -> Value {
    let tag = route
        .resource
        .rsplit('/')
        .next()
        .unwrap_or(route.resource);
    let parameters: Vec<Value> = route
        .params()
        .into_iter()
        .map(|name| json!({"name": name, "in": "path", "required": true, "schema": {"type": "string"}}))
        .collect();

    let mut op = json!({
        "operationId": route.name,
        "summary": format!("{} {}", route.operation, tag),
        "tags": [tag],
        "parameters": parameters,
        "responses": responses(route.operation),
    });
    if route.operation.reads_body() {
        op["requestBody"] = json!({
            "required": true,
            "content": {"application/json": {"schema": {"type": "object"}}}
        });
    }
    op
}

/// Build the document for `routes`, plus the fixed system routes.
pub fn openapi(routes: &[RouteInfo]) -> Value {
    let mut paths = Map::new();
    for route in routes {
        let entry = paths
            .entry(openapi_path(&route.path))
            .or_insert_with(|| Value::Object(Map::new()));
        entry[route.operation.method().as_str().to_lowercase()] = operation(route);
    }
    paths.insert(
        "/user/types".to_string(),
        json!({"get": {
            "operationId": "user-types",
            "summary": "list user types",
            "tags": ["user"],
            "responses": {"200": envelope_ref("OK")}
        }}),
    );

    json!({
        "openapi": "3.0.3",
        "info": {"title": "orgdesk API", "version": env!("CARGO_PKG_VERSION")},
        "paths": paths,
        "components": {"schemas": {"Envelope": {
            "type": "object",
            "required": ["status", "errors", "data"],
            "properties": {
                "status": {"type": "integer"},
                "errors": {"type": "array", "items": {"type": "string"}, "nullable": true},
                "data": {"nullable": true}
            }
        }}}
    })
}
