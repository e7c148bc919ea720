use std::sync::Arc;

use async_trait::async_trait;
use orgdesk_account::{NewUser, User, UserPatch};
use orgdesk_infra::storage::{Filter, RecordStore, Storer};
use serde::Deserialize;
use tracing::debug;

use super::{ORG_SCOPE, blocking, in_org, parent_id, update_and_reload};
use crate::generic::{Envelope, Request, ResourceService, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub org: String,
    #[serde(flatten)]
    pub user: NewUser,
}

impl Request for CreateUser {}

/// `/organization/:org/user/:user`
#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub org: String,
    pub user: String,
}

impl Request for UserParams {
    fn id(&self) -> Option<&str> {
        Some(&self.user)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsers {
    pub org: String,
}

impl Request for ListUsers {}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub org: String,
    pub user: String,
    #[serde(flatten)]
    pub patch: UserPatch,
}

impl Request for UpdateUser {
    fn id(&self) -> Option<&str> {
        Some(&self.user)
    }
}

/// Users of one organization. Passwords are hashed before they reach storage
/// and never appear in responses.
pub struct UserService {
    store: Arc<dyn Storer>,
}

impl UserService {
    pub fn new(store: Arc<dyn Storer>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResourceService for UserService {
    type Create = CreateUser;
    type Get = UserParams;
    type List = ListUsers;
    type Update = UpdateUser;
    type Delete = UserParams;

    fn name(&self) -> &'static str {
        "organization/:org/user"
    }

    fn path_params(&self) -> &'static [&'static str] {
        &["user"]
    }

    async fn create(&self, req: CreateUser) -> ServiceResult {
        let org = parent_id(&req.org)?;
        let new_user = req.user;
        let mut user = blocking(move || new_user.into_user(org)).await?;
        self.store.create(&mut user).await?;
        Envelope::ok(user)
    }

    async fn get(&self, req: UserParams) -> ServiceResult {
        let user: User = self.store.get(&in_org(&req.org, &req.user)).await?;
        Envelope::ok(user)
    }

    async fn list(&self, req: ListUsers, filter: Filter) -> ServiceResult {
        if filter.term("password").is_some() {
            return Err(ServiceError::Validation("unknown field: password".into()));
        }
        let filter = filter.scoped_to(ORG_SCOPE, &req.org);
        debug!(resource = "user", ?filter, "list");
        let users: Vec<User> = self.store.list(&filter).await?;
        Envelope::ok(users)
    }

    async fn update(&self, req: UpdateUser) -> ServiceResult {
        let patch = req.patch;
        let changes = blocking(move || patch.into_changes()).await?;
        update_and_reload::<User>(&*self.store, &in_org(&req.org, &req.user), &changes).await
    }

    async fn delete(&self, req: UserParams) -> Result<(), ServiceError> {
        self.store.delete::<User>(&in_org(&req.org, &req.user)).await?;
        Ok(())
    }
}
