//! Backend-neutral row representation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::id::RecordId;

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Uuid(Uuid),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<RecordId> for Value {
    fn from(value: RecordId) -> Self {
        Value::Uuid(value.into())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Column name → value mapping for one stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(BTreeMap<&'static str, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.0.insert(column, value.into());
    }

    pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn text(&self, column: &str) -> DomainResult<String> {
        self.opt_text(column)?
            .ok_or_else(|| DomainError::malformed_row(format!("{column} is null")))
    }

    pub fn opt_text(&self, column: &str) -> DomainResult<Option<String>> {
        match self.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s.clone())),
            Some(other) => Err(mismatch(column, "text", other)),
        }
    }

    pub fn record_id(&self, column: &str) -> DomainResult<RecordId> {
        self.opt_record_id(column)?
            .ok_or_else(|| DomainError::malformed_row(format!("{column} is null")))
    }

    pub fn opt_record_id(&self, column: &str) -> DomainResult<Option<RecordId>> {
        match self.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Uuid(u)) => Ok(Some(RecordId::from_uuid(*u))),
            Some(other) => Err(mismatch(column, "uuid", other)),
        }
    }

    pub fn opt_timestamp(&self, column: &str) -> DomainResult<Option<DateTime<Utc>>> {
        match self.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Timestamp(t)) => Ok(Some(*t)),
            Some(other) => Err(mismatch(column, "timestamp", other)),
        }
    }
}

fn mismatch(column: &str, expected: &str, got: &Value) -> DomainError {
    DomainError::malformed_row(format!("{column}: expected {expected}, got {got:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_becomes_null() {
        let v: Value = Option::<String>::None.into();
        assert!(v.is_null());
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn typed_getters_reject_mismatched_values() {
        let row = Row::new().with("name", "acme").with("org", RecordId::new());
        assert_eq!(row.text("name").unwrap(), "acme");
        assert!(row.record_id("org").is_ok());
        assert!(row.text("org").is_err());
        assert!(row.record_id("missing").is_err());
        assert_eq!(row.opt_text("missing").unwrap(), None);
    }
}
