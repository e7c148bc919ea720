use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orgdesk_core::schema::{ID_COLUMN, UPDATED_AT_COLUMN};
use orgdesk_core::{Changes, RecordSchema, Row, Value};

use super::check::{check_changes, check_row};
use super::error::{StorageError, StorageResult};
use super::filter::{Filter, Term, matches_all};
use super::r#trait::{Storer, now};

#[derive(Debug, Clone)]
struct StoredRow {
    row: Row,
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredRow {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug)]
struct Table {
    schema: &'static RecordSchema,
    rows: Vec<StoredRow>,
}

impl Table {
    fn live_matches<'a>(&'a self, terms: &'a [Term]) -> impl Iterator<Item = &'a StoredRow> {
        self.rows
            .iter()
            .filter(move |r| r.is_live() && matches_all(terms, &r.row))
    }

    /// Does any row other than those at `skip` hold `value` in `column`?
    fn holds(&self, column: &str, value: &Value, skip: &[usize]) -> bool {
        self.rows
            .iter()
            .enumerate()
            .any(|(i, r)| !skip.contains(&i) && r.row.get(column) == Some(value))
    }
}

/// In-memory relational store.
///
/// Intended for tests/dev. Enforces the same constraints the Postgres schema
/// declares (not-null, unique, foreign keys) so both backends behave alike.
/// Like Postgres, unique and foreign-key checks also consider soft-deleted rows.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<std::sync::RwLockReadGuard<'_, HashMap<&'static str, Table>>> {
        self.tables
            .read()
            .map_err(|_| StorageError::Persistence("lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> StorageResult<std::sync::RwLockWriteGuard<'_, HashMap<&'static str, Table>>> {
        self.tables
            .write()
            .map_err(|_| StorageError::Persistence("lock poisoned".to_string()))
    }
}

fn missing_table(table: &str) -> StorageError {
    StorageError::Persistence(format!("relation \"{table}\" does not exist"))
}

/// Foreign-key check: `value` must be the id of a row in the referenced table.
fn check_reference(
    tables: &HashMap<&'static str, Table>,
    column: &str,
    target: &str,
    value: &Value,
) -> StorageResult<()> {
    if value.is_null() {
        return Ok(());
    }
    let found = tables
        .get(target)
        .is_some_and(|t| t.holds(ID_COLUMN, value, &[]));
    if found {
        Ok(())
    } else {
        Err(StorageError::Constraint(format!(
            "{column} references a missing row in {target}"
        )))
    }
}

#[async_trait]
impl Storer for InMemoryStore {
    async fn migrate(&self, schemas: &[&'static RecordSchema]) -> StorageResult<()> {
        let mut tables = self.write()?;
        for schema in schemas {
            tables.entry(schema.table).or_insert_with(|| Table {
                schema,
                rows: Vec::new(),
            });
        }
        Ok(())
    }

    async fn insert(&self, schema: &'static RecordSchema, row: Row) -> StorageResult<u64> {
        check_row(schema, &row)?;

        let mut tables = self.write()?;
        let table = tables
            .get(schema.table)
            .ok_or_else(|| missing_table(schema.table))?;

        for column in schema.all_columns() {
            let value = row.get(column.name).unwrap_or(&Value::Null);
            let is_key = column.name == ID_COLUMN;
            if value.is_null() && (is_key || !column.nullable) {
                return Err(StorageError::Constraint(format!(
                    "null value in column {} of {}",
                    column.name, schema.table
                )));
            }
            if (is_key || column.unique) && !value.is_null() && table.holds(column.name, value, &[]) {
                return Err(StorageError::Constraint(format!(
                    "duplicate key value violates unique constraint on {}.{}",
                    schema.table, column.name
                )));
            }
            if let Some(target) = column.references {
                check_reference(&tables, column.name, target, value)?;
            }
        }

        let table = tables
            .get_mut(schema.table)
            .ok_or_else(|| missing_table(schema.table))?;
        table.rows.push(StoredRow {
            row,
            deleted_at: None,
        });
        Ok(1)
    }

    async fn find_first(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<Option<Row>> {
        let terms = filter.resolve(schema)?;
        let tables = self.read()?;
        let table = tables
            .get(schema.table)
            .ok_or_else(|| missing_table(schema.table))?;

        Ok(table
            .live_matches(&terms)
            .min_by_key(|r| r.row.opt_record_id(ID_COLUMN).ok().flatten())
            .map(|r| r.row.clone()))
    }

    async fn find_all(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<Vec<Row>> {
        let terms = filter.resolve(schema)?;
        let tables = self.read()?;
        let table = tables
            .get(schema.table)
            .ok_or_else(|| missing_table(schema.table))?;

        Ok(table.live_matches(&terms).map(|r| r.row.clone()).collect())
    }

    async fn update_where(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
        changes: &Changes,
    ) -> StorageResult<u64> {
        let terms = filter.resolve(schema)?;
        check_changes(schema, changes)?;

        let mut tables = self.write()?;
        let table = tables
            .get(schema.table)
            .ok_or_else(|| missing_table(schema.table))?;

        let hits: Vec<usize> = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_live() && matches_all(&terms, &r.row))
            .map(|(i, _)| i)
            .collect();
        if hits.is_empty() {
            return Ok(0);
        }

        for (name, value) in changes.iter() {
            let Some(column) = schema.declared(name) else {
                continue;
            };
            if value.is_null() && !column.nullable {
                return Err(StorageError::Constraint(format!(
                    "null value in column {name} of {}",
                    schema.table
                )));
            }
            if column.unique
                && !value.is_null()
                && (hits.len() > 1 || table.holds(name, value, &hits))
            {
                return Err(StorageError::Constraint(format!(
                    "duplicate key value violates unique constraint on {}.{name}",
                    schema.table
                )));
            }
            if let Some(target) = column.references {
                check_reference(&tables, name, target, value)?;
            }
        }

        let stamp = now();
        let table = tables
            .get_mut(schema.table)
            .ok_or_else(|| missing_table(schema.table))?;
        for &i in &hits {
            let row = &mut table.rows[i].row;
            for (name, value) in changes.iter() {
                row.set(name, value.clone());
            }
            row.set(UPDATED_AT_COLUMN, stamp);
        }
        Ok(hits.len() as u64)
    }

    async fn soft_delete_where(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<u64> {
        let terms = filter.resolve(schema)?;
        let stamp = now();

        let mut tables = self.write()?;
        let table = tables
            .get_mut(schema.table)
            .ok_or_else(|| missing_table(schema.table))?;

        let mut affected = 0;
        for stored in table
            .rows
            .iter_mut()
            .filter(|r| r.is_live() && matches_all(&terms, &r.row))
        {
            stored.deleted_at = Some(stamp);
            affected += 1;
        }
        Ok(affected)
    }
}
