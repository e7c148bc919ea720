//! Postgres-backed record store.
//!
//! Statements are generated from each [`RecordSchema`] with `sqlx::QueryBuilder`;
//! identifiers are always quoted and values are always bound.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StorageError |
//! |------------|----------------------|--------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (foreign key violation) | `23503` | `Constraint` |
//! | Database (not-null violation) | `23502` | `Constraint` |
//! | Database (other) | Any other | `Persistence` |
//! | PoolClosed / other | N/A | `Persistence` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orgdesk_core::schema::{DELETED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN};
use orgdesk_core::{Changes, Column, ColumnKind, RecordSchema, Row, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row as _};
use tracing::{Span, debug, instrument};
use uuid::Uuid;

use super::check::{check_changes, check_kind, check_row};
use super::error::{StorageError, StorageResult};
use super::filter::{Expected, Filter, Term};
use super::r#trait::{Storer, now};

/// Postgres-backed store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; the store can be
/// shared across request handlers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn push_ident(qb: &mut QueryBuilder<'static, Postgres>, name: &str) {
    qb.push(quote_ident(name));
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn push_value(
    qb: &mut QueryBuilder<'static, Postgres>,
    column: &Column,
    value: &Value,
) -> StorageResult<()> {
    check_kind(column, value)?;
    match (column.kind, value) {
        (_, Value::Uuid(u)) => qb.push_bind(*u),
        (_, Value::Text(s)) => qb.push_bind(s.clone()),
        (_, Value::Timestamp(t)) => qb.push_bind(*t),
        (ColumnKind::Uuid, Value::Null) => qb.push_bind(None::<Uuid>),
        (ColumnKind::Text, Value::Null) => qb.push_bind(None::<String>),
        (ColumnKind::Timestamp, Value::Null) => qb.push_bind(None::<DateTime<Utc>>),
    };
    Ok(())
}

/// `WHERE "deleted_at" IS NULL AND ...` for the resolved terms.
fn push_where(qb: &mut QueryBuilder<'static, Postgres>, terms: &[Term]) {
    qb.push(" WHERE ");
    push_ident(qb, DELETED_AT_COLUMN);
    qb.push(" IS NULL");
    for term in terms {
        qb.push(" AND ");
        match &term.expected {
            Expected::Uuid(u) => {
                push_ident(qb, term.column.name);
                qb.push(" = ").push_bind(*u);
            }
            Expected::Text(s) => {
                push_ident(qb, term.column.name);
                qb.push(" = ").push_bind(s.clone());
            }
            Expected::Never => {
                qb.push("FALSE");
            }
        }
    }
}

pub(crate) fn select_query(
    schema: &RecordSchema,
    terms: &[Term],
    first_only: bool,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    for (i, column) in schema.all_columns().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_ident(&mut qb, column.name);
    }
    qb.push(" FROM ");
    push_ident(&mut qb, schema.table);
    push_where(&mut qb, terms);
    if first_only {
        qb.push(" ORDER BY ");
        push_ident(&mut qb, ID_COLUMN);
        qb.push(" LIMIT 1");
    } else {
        qb.push(" ORDER BY \"created_at\", ");
        push_ident(&mut qb, ID_COLUMN);
    }
    qb
}

pub(crate) fn insert_query(
    schema: &RecordSchema,
    row: &Row,
) -> StorageResult<QueryBuilder<'static, Postgres>> {
    let mut qb = QueryBuilder::new("INSERT INTO ");
    push_ident(&mut qb, schema.table);
    qb.push(" (");
    for (i, column) in schema.all_columns().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_ident(&mut qb, column.name);
    }
    qb.push(") VALUES (");
    for (i, column) in schema.all_columns().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, column, row.get(column.name).unwrap_or(&Value::Null))?;
    }
    qb.push(")");
    Ok(qb)
}

pub(crate) fn update_query(
    schema: &RecordSchema,
    terms: &[Term],
    changes: &Changes,
    stamp: DateTime<Utc>,
) -> StorageResult<QueryBuilder<'static, Postgres>> {
    let mut qb = QueryBuilder::new("UPDATE ");
    push_ident(&mut qb, schema.table);
    qb.push(" SET ");
    for (name, value) in changes.iter() {
        let column = schema
            .declared(name)
            .ok_or_else(|| StorageError::UnknownField(name.to_string()))?;
        push_ident(&mut qb, name);
        qb.push(" = ");
        push_value(&mut qb, column, value)?;
        qb.push(", ");
    }
    push_ident(&mut qb, UPDATED_AT_COLUMN);
    qb.push(" = ").push_bind(stamp);
    push_where(&mut qb, terms);
    Ok(qb)
}

pub(crate) fn soft_delete_query(
    schema: &RecordSchema,
    terms: &[Term],
    stamp: DateTime<Utc>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE ");
    push_ident(&mut qb, schema.table);
    qb.push(" SET ");
    push_ident(&mut qb, DELETED_AT_COLUMN);
    qb.push(" = ").push_bind(stamp);
    push_where(&mut qb, terms);
    qb
}

fn sql_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Uuid => "UUID",
        ColumnKind::Text => "TEXT",
        ColumnKind::Timestamp => "TIMESTAMPTZ",
    }
}

/// DDL bringing `schema`'s table up to date. Safe to run repeatedly.
///
/// Columns added to an existing table are added as nullable; constraints are
/// only declared when the table is first created.
pub(crate) fn migration_statements(schema: &RecordSchema) -> Vec<String> {
    let table = quote_ident(schema.table);

    let mut defs = vec![format!("{} UUID PRIMARY KEY", quote_ident(ID_COLUMN))];
    for column in RecordSchema::bookkeeping().iter().skip(1) {
        defs.push(format!("{} {}", quote_ident(column.name), sql_type(column.kind)));
    }
    defs.push(format!("{} TIMESTAMPTZ", quote_ident(DELETED_AT_COLUMN)));
    for column in schema.columns {
        let mut def = format!("{} {}", quote_ident(column.name), sql_type(column.kind));
        if !column.nullable {
            def.push_str(" NOT NULL");
        }
        if column.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(target) = column.references {
            def.push_str(&format!(
                " REFERENCES {} ({})",
                quote_ident(target),
                quote_ident(ID_COLUMN)
            ));
        }
        defs.push(def);
    }

    let mut statements = vec![format!(
        "CREATE TABLE IF NOT EXISTS {table} ({})",
        defs.join(", ")
    )];
    for column in schema.columns {
        statements.push(format!(
            "ALTER TABLE {table} ADD COLUMN IF NOT EXISTS {} {}",
            quote_ident(column.name),
            sql_type(column.kind)
        ));
    }
    statements.push(format!(
        "CREATE INDEX IF NOT EXISTS {} ON {table} ({})",
        quote_ident(&format!("idx_{}_deleted_at", schema.table)),
        quote_ident(DELETED_AT_COLUMN)
    ));
    statements
}

fn decode_row(schema: &RecordSchema, pg: &PgRow) -> StorageResult<Row> {
    let mut row = Row::new();
    for column in schema.all_columns() {
        let value = match column.kind {
            ColumnKind::Uuid => pg.try_get::<Option<Uuid>, _>(column.name).map(Value::from),
            ColumnKind::Text => pg.try_get::<Option<String>, _>(column.name).map(Value::from),
            ColumnKind::Timestamp => pg
                .try_get::<Option<DateTime<Utc>>, _>(column.name)
                .map(Value::from),
        }
        .map_err(|e| {
            StorageError::Persistence(format!(
                "failed to decode {}.{}: {}",
                schema.table, column.name, e
            ))
        })?;
        row.set(column.name, value);
    }
    Ok(row)
}

#[async_trait]
impl Storer for PostgresStore {
    #[instrument(skip(self, schemas), fields(tables = schemas.len()), err)]
    async fn migrate(&self, schemas: &[&'static RecordSchema]) -> StorageResult<()> {
        for schema in schemas {
            for statement in migration_statements(schema) {
                debug!(table = schema.table, sql = %statement, "migration statement");
                sqlx::query(&statement)
                    .execute(&*self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("migrate", e))?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self, schema, row), fields(table = schema.table), err)]
    async fn insert(&self, schema: &'static RecordSchema, row: Row) -> StorageResult<u64> {
        check_row(schema, &row)?;
        let result = insert_query(schema, &row)?
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, schema, filter), fields(table = schema.table), err)]
    async fn find_first(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<Option<Row>> {
        let terms = filter.resolve(schema)?;
        let found = select_query(schema, &terms, true)
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_first", e))?;
        found.map(|pg| decode_row(schema, &pg)).transpose()
    }

    #[instrument(skip(self, schema, filter), fields(table = schema.table, row_count = tracing::field::Empty), err)]
    async fn find_all(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<Vec<Row>> {
        let terms = filter.resolve(schema)?;
        let rows = select_query(schema, &terms, false)
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all", e))?;

        Span::current().record("row_count", rows.len());
        rows.iter().map(|pg| decode_row(schema, pg)).collect()
    }

    #[instrument(skip(self, schema, filter, changes), fields(table = schema.table, columns = ?changes.columns()), err)]
    async fn update_where(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
        changes: &Changes,
    ) -> StorageResult<u64> {
        let terms = filter.resolve(schema)?;
        check_changes(schema, changes)?;
        let result = update_query(schema, &terms, changes, now())?
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, schema, filter), fields(table = schema.table), err)]
    async fn soft_delete_where(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<u64> {
        let terms = filter.resolve(schema)?;
        let result = soft_delete_query(schema, &terms, now())
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("soft_delete", e))?;
        Ok(result.rows_affected())
    }
}

/// Map SQLx errors to StorageError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // unique, foreign key, not null
                Some("23505") | Some("23503") | Some("23502") => StorageError::Constraint(msg),
                _ => StorageError::Persistence(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StorageError::Persistence(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::RowNotFound => StorageError::NotFound,
        _ => StorageError::Persistence(format!("sqlx error in {}: {}", operation, err)),
    }
}
