//! Column schema descriptors.
//!
//! A [`RecordSchema`] is the only thing the storage layer knows about a record
//! type: its table, its declared columns, and (for nested resources) the column
//! that scopes it to a parent. Migrations are derived from the same descriptor.

/// Name of the primary-key column every table carries.
pub const ID_COLUMN: &str = "uuid";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";
/// Soft-delete marker. Managed by the store, never exposed as a filterable column.
pub const DELETED_AT_COLUMN: &str = "deleted_at";

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Uuid,
    Text,
    Timestamp,
}

/// A single declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub unique: bool,
    /// Table whose primary key this column references.
    pub references: Option<&'static str>,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            unique: false,
            references: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn uuid(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Uuid)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Timestamp)
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn references(mut self, table: &'static str) -> Self {
        self.references = Some(table);
        self
    }

    /// Timestamps are not filterable: their textual form differs between backends.
    pub fn is_filterable(&self) -> bool {
        !matches!(self.kind, ColumnKind::Timestamp)
    }
}

static BOOKKEEPING: [Column; 3] = [
    Column::uuid(ID_COLUMN),
    Column::timestamp(CREATED_AT_COLUMN).nullable(),
    Column::timestamp(UPDATED_AT_COLUMN).nullable(),
];

/// Shape of a record type as seen by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    pub table: &'static str,
    pub columns: &'static [Column],
    /// Column that scopes this record to a parent resource (e.g. `org_uuid`).
    pub parent_key: Option<&'static str>,
}

impl RecordSchema {
    pub const fn new(table: &'static str, columns: &'static [Column]) -> Self {
        Self {
            table,
            columns,
            parent_key: None,
        }
    }

    pub const fn scoped_by(mut self, parent_key: &'static str) -> Self {
        self.parent_key = Some(parent_key);
        self
    }

    /// Columns the store maintains on every table (`uuid`, `created_at`, `updated_at`).
    pub fn bookkeeping() -> &'static [Column] {
        &BOOKKEEPING
    }

    /// Bookkeeping columns followed by the declared columns, in table order.
    pub fn all_columns(&self) -> impl Iterator<Item = &'static Column> {
        BOOKKEEPING.iter().chain(self.columns.iter())
    }

    /// Look up any column (bookkeeping or declared) by name.
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.all_columns().find(|c| c.name == name)
    }

    /// Look up a declared column by name.
    pub fn declared(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static COLUMNS: [Column; 2] = [
        Column::text("name"),
        Column::uuid("org_uuid").references("organizations"),
    ];
    static SCHEMA: RecordSchema = RecordSchema::new("things", &COLUMNS).scoped_by("org_uuid");

    #[test]
    fn all_columns_lists_bookkeeping_first() {
        let names: Vec<_> = SCHEMA.all_columns().map(|c| c.name).collect();
        assert_eq!(names, vec!["uuid", "created_at", "updated_at", "name", "org_uuid"]);
    }

    #[test]
    fn declared_excludes_bookkeeping() {
        assert!(SCHEMA.declared("uuid").is_none());
        assert!(SCHEMA.column("uuid").is_some());
        assert_eq!(SCHEMA.declared("org_uuid").unwrap().references, Some("organizations"));
    }

    #[test]
    fn timestamps_are_not_filterable() {
        assert!(!SCHEMA.column("created_at").unwrap().is_filterable());
        assert!(SCHEMA.column("name").unwrap().is_filterable());
    }
}
