//! Field/value filters for Get, List, Update and Delete.
//!
//! A [`Filter`] holds two kinds of terms:
//! - client terms, usually taken from a list request's query string;
//! - an optional scope term injected by the service (e.g. the parent
//!   organization of a nested resource). The scope always wins over a client
//!   term with the same key.
//!
//! Filters are resolved against a [`RecordSchema`] before they reach a backend,
//! so both stores see the same validated [`Term`]s.

use std::collections::BTreeMap;

use orgdesk_core::{Column, ColumnKind, RecordSchema, Row, Value};
use uuid::Uuid;

use super::error::{StorageError, StorageResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    scope: Option<(&'static str, String)>,
    terms: BTreeMap<String, String>,
}

impl Filter {
    /// A filter with no scope; valid only for top-level record types.
    pub fn unscoped() -> Self {
        Self::default()
    }

    pub fn scoped(key: &'static str, value: impl ToString) -> Self {
        Self::unscoped().scoped_to(key, value)
    }

    /// Build from client-supplied pairs. Later duplicates overwrite earlier ones.
    pub fn from_query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let terms = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { scope: None, terms }
    }

    pub fn eq(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.insert(key.into(), value.into());
        self
    }

    pub fn scoped_to(mut self, key: &'static str, value: impl ToString) -> Self {
        self.scope = Some((key, value.to_string()));
        self
    }

    pub fn scope(&self) -> Option<(&'static str, &str)> {
        self.scope.as_ref().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn is_scoped_by(&self, key: &str) -> bool {
        matches!(self.scope, Some((k, _)) if k == key)
    }

    /// Client term value, if any.
    pub fn term(&self, key: &str) -> Option<&str> {
        self.terms.get(key).map(String::as_str)
    }

    /// Validate against `schema` and turn every term into a typed [`Term`].
    pub fn resolve(&self, schema: &RecordSchema) -> StorageResult<Vec<Term>> {
        if let Some(parent_key) = schema.parent_key {
            if !self.is_scoped_by(parent_key) {
                return Err(StorageError::MissingScope {
                    table: schema.table,
                    key: parent_key,
                });
            }
        }

        let scope_key = self.scope.as_ref().map(|(k, _)| *k);
        let client = self
            .terms
            .iter()
            .filter(|(k, _)| Some(k.as_str()) != scope_key);

        let mut resolved = Vec::with_capacity(self.terms.len() + 1);
        if let Some((key, value)) = &self.scope {
            resolved.push(Term::resolve(schema, key, value)?);
        }
        for (key, value) in client {
            resolved.push(Term::resolve(schema, key, value)?);
        }
        Ok(resolved)
    }
}

/// Expected value of a resolved term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Uuid(Uuid),
    Text(String),
    /// The client value can never equal a stored value (e.g. a malformed UUID).
    Never,
}

/// One validated `column = value` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub column: &'static Column,
    pub expected: Expected,
}

impl Term {
    fn resolve(schema: &RecordSchema, key: &str, value: &str) -> StorageResult<Self> {
        let column = schema
            .column(key)
            .filter(|c| c.is_filterable())
            .ok_or_else(|| StorageError::UnknownField(key.to_string()))?;

        let expected = match column.kind {
            ColumnKind::Uuid => Uuid::parse_str(value)
                .map(Expected::Uuid)
                .unwrap_or(Expected::Never),
            ColumnKind::Text => Expected::Text(value.to_string()),
            ColumnKind::Timestamp => Expected::Never,
        };
        Ok(Self { column, expected })
    }

    pub fn matches(&self, row: &Row) -> bool {
        match (&self.expected, row.get(self.column.name)) {
            (Expected::Uuid(want), Some(Value::Uuid(got))) => want == got,
            (Expected::Text(want), Some(Value::Text(got))) => want == got,
            _ => false,
        }
    }
}

pub fn matches_all(terms: &[Term], row: &Row) -> bool {
    terms.iter().all(|t| t.matches(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgdesk_core::RecordId;

    static COLUMNS: [Column; 2] = [
        Column::text("name"),
        Column::uuid("org_uuid").references("organizations"),
    ];
    static TAGS: RecordSchema = RecordSchema::new("tags", &COLUMNS).scoped_by("org_uuid");
    static FLAT: RecordSchema = RecordSchema::new("flat", &COLUMNS);

    #[test]
    fn scoped_schema_requires_scope() {
        let err = Filter::unscoped().eq("name", "x").resolve(&TAGS).unwrap_err();
        assert_eq!(
            err,
            StorageError::MissingScope {
                table: "tags",
                key: "org_uuid"
            }
        );
    }

    #[test]
    fn client_term_cannot_override_scope() {
        let mine = RecordId::new();
        let theirs = RecordId::new();
        let filter = Filter::from_query([("org_uuid", theirs.to_string())]).scoped_to("org_uuid", mine);

        let terms = filter.resolve(&TAGS).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].expected, Expected::Uuid(*mine.as_uuid()));
    }

    #[test]
    fn unknown_and_timestamp_keys_are_rejected() {
        assert_eq!(
            Filter::from_query([("nope", "1")]).resolve(&FLAT).unwrap_err(),
            StorageError::UnknownField("nope".into())
        );
        assert!(matches!(
            Filter::from_query([("created_at", "2024-01-01")]).resolve(&FLAT),
            Err(StorageError::UnknownField(_))
        ));
    }

    #[test]
    fn malformed_uuid_matches_nothing() {
        let terms = Filter::unscoped().eq("uuid", "bad-uuid").resolve(&FLAT).unwrap();
        let row = Row::new().with("uuid", RecordId::new());
        assert_eq!(terms[0].expected, Expected::Never);
        assert!(!matches_all(&terms, &row));
    }

    #[test]
    fn text_terms_compare_exactly() {
        let terms = Filter::unscoped().eq("name", "Acme").resolve(&FLAT).unwrap();
        assert!(matches_all(&terms, &Row::new().with("name", "Acme")));
        assert!(!matches_all(&terms, &Row::new().with("name", "acme")));
        assert!(!matches_all(&terms, &Row::new().with("name", Value::Null)));
    }
}
