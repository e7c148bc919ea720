use async_trait::async_trait;
use orgdesk_infra::storage::Filter;
use serde::de::DeserializeOwned;

use super::envelope::ServiceResult;
use super::error::ServiceError;

/// A per-operation request bound from transport data.
pub trait Request: DeserializeOwned + Send + 'static {
    /// Identifier of the targeted record, when the operation addresses one.
    fn id(&self) -> Option<&str> {
        None
    }
}

/// CRUD capability set shared by every mounted resource.
///
/// Each operation has its own request type, so the mount binds straight into
/// the right shape and implementations never downcast.
#[async_trait]
pub trait ResourceService: Send + Sync + 'static {
    type Create: Request;
    type Get: Request;
    type List: Request;
    type Update: Request;
    type Delete: Request;

    /// Group path without the leading slash. May hold parent placeholders
    /// such as `organization/:org/tag`.
    fn name(&self) -> &'static str;

    /// Parameters appended to the group path for item operations.
    fn path_params(&self) -> &'static [&'static str];

    async fn create(&self, req: Self::Create) -> ServiceResult;

    async fn get(&self, req: Self::Get) -> ServiceResult;

    /// `filter` carries the client's query terms; implementations add any
    /// parent scope before reaching storage.
    async fn list(&self, req: Self::List, filter: Filter) -> ServiceResult;

    async fn update(&self, req: Self::Update) -> ServiceResult;

    async fn delete(&self, req: Self::Delete) -> Result<(), ServiceError>;
}
