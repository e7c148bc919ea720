use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use orgdesk_core::{Changes, Record, RecordSchema, Row};
use tracing::error;

use super::error::{StorageError, StorageResult};
use super::filter::Filter;

/// Row-level storage capability.
///
/// Backends know nothing about concrete record types: they receive a
/// [`RecordSchema`] and untyped [`Row`]s. Typed access goes through
/// [`RecordStore`], which every `Storer` gets for free.
///
/// Implementations must:
/// - exclude soft-deleted rows from every read, update and delete
/// - stamp `updated_at` on every row an update touches
/// - reject filters that fail [`Filter::resolve`] for the schema
#[async_trait]
pub trait Storer: Send + Sync {
    /// Make sure every table exists. Parents must come before children.
    async fn migrate(&self, schemas: &[&'static RecordSchema]) -> StorageResult<()>;

    /// Persist a complete row (bookkeeping included).
    async fn insert(&self, schema: &'static RecordSchema, row: Row) -> StorageResult<u64>;

    /// First live row matching `filter`, ordered by `uuid`.
    async fn find_first(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<Option<Row>>;

    /// All live rows matching `filter`, oldest first.
    async fn find_all(&self, schema: &'static RecordSchema, filter: &Filter)
    -> StorageResult<Vec<Row>>;

    async fn update_where(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
        changes: &Changes,
    ) -> StorageResult<u64>;

    /// Mark every live match as deleted. Zero matches is not an error.
    async fn soft_delete_where(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<u64>;
}

#[async_trait]
impl<S> Storer for Arc<S>
where
    S: Storer + ?Sized,
{
    async fn migrate(&self, schemas: &[&'static RecordSchema]) -> StorageResult<()> {
        (**self).migrate(schemas).await
    }

    async fn insert(&self, schema: &'static RecordSchema, row: Row) -> StorageResult<u64> {
        (**self).insert(schema, row).await
    }

    async fn find_first(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<Option<Row>> {
        (**self).find_first(schema, filter).await
    }

    async fn find_all(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<Vec<Row>> {
        (**self).find_all(schema, filter).await
    }

    async fn update_where(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
        changes: &Changes,
    ) -> StorageResult<u64> {
        (**self).update_where(schema, filter, changes).await
    }

    async fn soft_delete_where(
        &self,
        schema: &'static RecordSchema,
        filter: &Filter,
    ) -> StorageResult<u64> {
        (**self).soft_delete_where(schema, filter).await
    }
}

/// Current time at the precision Postgres keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Typed CRUD over any [`Storer`].
#[async_trait]
pub trait RecordStore {
    /// Assign identity and timestamps to `record`, then persist it.
    ///
    /// `record` is only modified if the insert succeeds.
    async fn create<R: Record>(&self, record: &mut R) -> StorageResult<u64>;

    /// First match, or [`StorageError::NotFound`].
    async fn get<R: Record>(&self, filter: &Filter) -> StorageResult<R>;

    async fn list<R: Record>(&self, filter: &Filter) -> StorageResult<Vec<R>>;

    async fn update<R: Record>(&self, filter: &Filter, changes: &Changes) -> StorageResult<u64>;

    async fn delete<R: Record>(&self, filter: &Filter) -> StorageResult<u64>;
}

#[async_trait]
impl<S> RecordStore for S
where
    S: Storer + ?Sized,
{
    async fn create<R: Record>(&self, record: &mut R) -> StorageResult<u64> {
        let schema = R::schema();
        let mut meta = record.meta().clone();
        meta.assign_new(now());

        let mut row = record.to_row();
        meta.write_to(&mut row);

        let affected = self
            .insert(schema, row)
            .await
            .inspect_err(|e| error!(op = "storage.create", table = schema.table, error = %e))?;
        *record.meta_mut() = meta;
        Ok(affected)
    }

    async fn get<R: Record>(&self, filter: &Filter) -> StorageResult<R> {
        let schema = R::schema();
        let row = self
            .find_first(schema, filter)
            .await
            .inspect_err(|e| error!(op = "storage.get", table = schema.table, error = %e))?
            .ok_or(StorageError::NotFound)?;
        Ok(R::from_full_row(&row)?)
    }

    async fn list<R: Record>(&self, filter: &Filter) -> StorageResult<Vec<R>> {
        let schema = R::schema();
        let rows = self
            .find_all(schema, filter)
            .await
            .inspect_err(|e| error!(op = "storage.list", table = schema.table, error = %e))?;
        rows.iter()
            .map(|row| R::from_full_row(row).map_err(StorageError::from))
            .collect()
    }

    async fn update<R: Record>(&self, filter: &Filter, changes: &Changes) -> StorageResult<u64> {
        let schema = R::schema();
        self.update_where(schema, filter, changes)
            .await
            .inspect_err(|e| error!(op = "storage.update", table = schema.table, error = %e))
    }

    async fn delete<R: Record>(&self, filter: &Filter) -> StorageResult<u64> {
        let schema = R::schema();
        self.soft_delete_where(schema, filter)
            .await
            .inspect_err(|e| error!(op = "storage.delete", table = schema.table, error = %e))
    }
}
