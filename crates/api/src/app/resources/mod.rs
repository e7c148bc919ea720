//! Concrete resource services mounted by the application.

use orgdesk_core::{Changes, Record, RecordId};
use orgdesk_infra::storage::{Filter, RecordStore, Storer};
use serde::Serialize;

use crate::generic::{Envelope, ServiceError, ServiceResult};

pub mod organization;
pub mod tag;
pub mod user;

pub use organization::OrganizationService;
pub use tag::TagService;
pub use user::UserService;

/// Column holding the owning organization of nested resources.
pub const ORG_SCOPE: &str = "org_uuid";

/// Parent identifier taken from the route for a create.
fn parent_id(raw: &str) -> Result<RecordId, ServiceError> {
    raw.parse::<RecordId>().map_err(ServiceError::from)
}

/// Filter selecting one record of an organization.
fn in_org(org: &str, id: &str) -> Filter {
    Filter::scoped(ORG_SCOPE, org).eq("uuid", id)
}

/// Apply `changes` to the single record selected by `filter` and return it
/// as stored afterwards.
async fn update_and_reload<R>(store: &dyn Storer, filter: &Filter, changes: &Changes) -> ServiceResult
where
    R: Record + Serialize,
{
    if store.update::<R>(filter, changes).await? == 0 {
        return Err(ServiceError::NotFound);
    }
    let record: R = store.get(filter).await?;
    Envelope::ok(record)
}

/// Run CPU-heavy payload preparation (password hashing) off the runtime.
async fn blocking<T, E>(f: impl FnOnce() -> Result<T, E> + Send + 'static) -> Result<T, ServiceError>
where
    T: Send + 'static,
    E: Into<ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(format!("blocking task failed: {e}")))?
        .map_err(Into::into)
}
