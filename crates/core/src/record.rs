//! Record trait and bookkeeping metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DomainResult;
use crate::id::RecordId;
use crate::schema::{CREATED_AT_COLUMN, ID_COLUMN, RecordSchema, UPDATED_AT_COLUMN};
use crate::value::Row;

/// Bookkeeping fields carried by every record.
///
/// All of them are assigned by the store; a freshly built record has none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RecordMeta {
    pub fn id(&self) -> Option<RecordId> {
        self.uuid
    }

    /// Stamp identity and timestamps for a record about to be inserted.
    pub fn assign_new(&mut self, now: DateTime<Utc>) {
        self.uuid = Some(RecordId::new());
        self.created_at = Some(now);
        self.updated_at = Some(now);
        self.deleted_at = None;
    }

    pub fn write_to(&self, row: &mut Row) {
        row.set(ID_COLUMN, self.uuid);
        row.set(CREATED_AT_COLUMN, self.created_at);
        row.set(UPDATED_AT_COLUMN, self.updated_at);
    }

    pub fn read_from(row: &Row) -> DomainResult<Self> {
        Ok(Self {
            uuid: row.opt_record_id(ID_COLUMN)?,
            created_at: row.opt_timestamp(CREATED_AT_COLUMN)?,
            updated_at: row.opt_timestamp(UPDATED_AT_COLUMN)?,
            deleted_at: None,
        })
    }
}

/// A persistable record type.
///
/// Implementors describe their table through [`Record::schema`] and convert
/// their declared columns to and from a [`Row`]. Bookkeeping columns are
/// handled here and by the store.
pub trait Record: Send + Sync + Sized + 'static {
    fn schema() -> &'static RecordSchema;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Declared columns only.
    fn to_row(&self) -> Row;

    fn from_row(meta: RecordMeta, row: &Row) -> DomainResult<Self>;

    /// Declared columns plus bookkeeping.
    fn to_full_row(&self) -> Row {
        let mut row = self.to_row();
        self.meta().write_to(&mut row);
        row
    }

    fn from_full_row(row: &Row) -> DomainResult<Self> {
        let meta = RecordMeta::read_from(row)?;
        Self::from_row(meta, row)
    }
}
