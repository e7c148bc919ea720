//! Uniform response envelope: `{"status": int, "errors": [string] | null, "data": any}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ServiceError;

pub type ServiceResult = Result<Envelope, ServiceError>;

/// Response body shared by every mounted resource.
///
/// The HTTP status of the response always equals `status`. On error `data` is
/// `null` and `errors` is non-empty; on success `errors` is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: u16,
    pub errors: Option<Vec<String>>,
    pub data: Value,
}

impl Envelope {
    /// 200 with `data` serialized as JSON.
    pub fn ok(data: impl Serialize) -> ServiceResult {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn with_status(status: StatusCode, data: impl Serialize) -> ServiceResult {
        let data = serde_json::to_value(data)
            .map_err(|e| ServiceError::Internal(format!("response serialization failed: {e}")))?;
        Ok(Self {
            status: status.as_u16(),
            errors: None,
            data,
        })
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            errors: Some(vec![message.into()]),
            data: Value::Null,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_has_null_errors() {
        let env = Envelope::ok(json!({"name": "Acme"})).unwrap();
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"status": 200, "errors": null, "data": {"name": "Acme"}})
        );
    }

    #[test]
    fn error_has_null_data() {
        let env = Envelope::error(StatusCode::NOT_FOUND, "record not found");
        assert_eq!(env.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"status": 404, "errors": ["record not found"], "data": null})
        );
    }

    #[test]
    fn response_status_mirrors_envelope() {
        let res = Envelope::error(StatusCode::BAD_REQUEST, "bad").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
