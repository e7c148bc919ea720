use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orgdesk_account::{AccountError, PasswordError};
use orgdesk_core::DomainError;
use orgdesk_infra::storage::StorageError;
use thiserror::Error;

use super::envelope::Envelope;

/// Business-level failure of a service call, classified for the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("record not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Persistence(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn into_envelope(self) -> Envelope {
        Envelope::error(self.status(), self.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        self.into_envelope().into_response()
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound => ServiceError::NotFound,
            StorageError::UnknownField(_) => ServiceError::Validation(value.to_string()),
            StorageError::MissingScope { .. } => ServiceError::Internal(value.to_string()),
            StorageError::Persistence(_) | StorageError::Constraint(_) => {
                ServiceError::Persistence(value.to_string())
            }
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(_) | DomainError::InvalidId(_) => {
                ServiceError::Validation(value.to_string())
            }
            DomainError::MalformedRow(_) => ServiceError::Persistence(value.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        ServiceError::Internal(value.to_string())
    }
}

impl From<AccountError> for ServiceError {
    fn from(value: AccountError) -> Self {
        match value {
            AccountError::Domain(e) => e.into(),
            AccountError::Password(e) => e.into(),
        }
    }
}
