use axum::http::{Method, StatusCode};
use serde::Serialize;

/// The five operations every mounted resource exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Get,
    List,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::List,
        Operation::Get,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Operation::Create => Method::POST,
            Operation::Get | Operation::List => Method::GET,
            Operation::Update => Method::PATCH,
            Operation::Delete => Method::DELETE,
        }
    }

    /// Whether the JSON body is bound into the request.
    pub fn reads_body(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }

    /// Whether query parameters are bound into the request.
    pub fn reads_query(&self) -> bool {
        matches!(self, Operation::List)
    }

    /// Item operations are served on the group path plus the resource's own parameters.
    pub fn targets_item(&self) -> bool {
        matches!(self, Operation::Get | Operation::Update | Operation::Delete)
    }

    /// Status returned when transport data cannot be bound.
    pub fn bind_failure_status(&self) -> StatusCode {
        match self {
            Operation::Create | Operation::Get | Operation::List => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Operation::Update | Operation::Delete => StatusCode::BAD_REQUEST,
        }
    }

    /// `<param>-<op>`, e.g. `org-create`.
    pub fn route_name(&self, first_param: &str) -> String {
        format!("{first_param}-{}", self.as_str())
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_failures_split_by_operation() {
        assert_eq!(Operation::Create.bind_failure_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Operation::List.bind_failure_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Operation::Update.bind_failure_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Operation::Delete.bind_failure_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn route_names_use_first_param() {
        assert_eq!(Operation::Delete.route_name("tag"), "tag-delete");
        assert!(Operation::ALL.iter().filter(|op| op.targets_item()).count() == 3);
    }
}
