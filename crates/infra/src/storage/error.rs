use orgdesk_core::DomainError;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage operation error.
///
/// These are infrastructure errors. The service layer decides how each one is
/// presented to clients (`NotFound` becomes a 404, the rest mostly 500).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A keyed lookup matched zero rows.
    #[error("record not found")]
    NotFound,

    /// Connection failures, malformed rows and anything else the backend reports.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A filter or change set named a column the record type does not have.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A parent-scoped record type was queried without its parent key.
    #[error("query on {table} is missing its `{key}` scope")]
    MissingScope {
        table: &'static str,
        key: &'static str,
    },

    /// Not-null, unique or foreign-key violation.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<DomainError> for StorageError {
    fn from(value: DomainError) -> Self {
        StorageError::Persistence(value.to_string())
    }
}
