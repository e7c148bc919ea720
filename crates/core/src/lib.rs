//! `orgdesk-core`: record building blocks shared by every resource.
//!
//! This crate contains **no infrastructure**: it only describes what a record
//! looks like (identity, bookkeeping metadata, column schema, row values) so the
//! storage layer can persist any record type without knowing about it.

pub mod error;
pub mod id;
pub mod patch;
pub mod record;
pub mod schema;
pub mod value;

pub use error::{DomainError, DomainResult};
pub use id::RecordId;
pub use patch::{Changes, Field};
pub use record::{Record, RecordMeta};
pub use schema::{Column, ColumnKind, RecordSchema};
pub use value::{Row, Value};
