//! Storage abstraction over arbitrary record types.
//!
//! [`Storer`] is the backend seam (rows in, rows out); [`RecordStore`] layers
//! typed create/get/list/update/delete on top of any `Storer`. Two backends are
//! provided: [`InMemoryStore`] for tests/dev and [`PostgresStore`].

pub mod check;
pub mod error;
pub mod filter;
pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use error::{StorageError, StorageResult};
pub use filter::Filter;
pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{RecordStore, Storer};
