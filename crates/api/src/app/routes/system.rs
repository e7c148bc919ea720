use axum::http::StatusCode;
use orgdesk_account::user_types;

use crate::generic::{Envelope, ServiceResult};

pub async fn hello() -> &'static str {
    "Hello !"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Every user type, wrapped in the standard envelope.
pub async fn list_user_types() -> ServiceResult {
    Envelope::ok(user_types())
}
