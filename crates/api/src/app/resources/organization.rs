use std::sync::Arc;

use async_trait::async_trait;
use orgdesk_account::{NewOrganization, Organization, OrganizationPatch};
use orgdesk_infra::storage::{Filter, RecordStore, Storer};
use serde::Deserialize;
use tracing::debug;

use super::update_and_reload;
use crate::generic::{Envelope, Request, ResourceService, ServiceError, ServiceResult};

impl Request for NewOrganization {}

/// `/organization/:org`
#[derive(Debug, Deserialize)]
pub struct OrgParams {
    pub org: String,
}

impl Request for OrgParams {
    fn id(&self) -> Option<&str> {
        Some(&self.org)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListOrganizations {}

impl Request for ListOrganizations {}

#[derive(Debug, Deserialize)]
pub struct UpdateOrganization {
    pub org: String,
    #[serde(flatten)]
    pub patch: OrganizationPatch,
}

impl Request for UpdateOrganization {
    fn id(&self) -> Option<&str> {
        Some(&self.org)
    }
}

pub struct OrganizationService {
    store: Arc<dyn Storer>,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn Storer>) -> Self {
        Self { store }
    }

    fn by_id(id: &str) -> Filter {
        Filter::unscoped().eq("uuid", id)
    }
}

#[async_trait]
impl ResourceService for OrganizationService {
    type Create = NewOrganization;
    type Get = OrgParams;
    type List = ListOrganizations;
    type Update = UpdateOrganization;
    type Delete = OrgParams;

    fn name(&self) -> &'static str {
        "organization"
    }

    fn path_params(&self) -> &'static [&'static str] {
        &["org"]
    }

    async fn create(&self, req: NewOrganization) -> ServiceResult {
        let mut org = req.into_organization()?;
        self.store.create(&mut org).await?;
        Envelope::ok(org)
    }

    async fn get(&self, req: OrgParams) -> ServiceResult {
        let org: Organization = self.store.get(&Self::by_id(&req.org)).await?;
        Envelope::ok(org)
    }

    async fn list(&self, _req: ListOrganizations, filter: Filter) -> ServiceResult {
        debug!(resource = "organization", ?filter, "list");
        let orgs: Vec<Organization> = self.store.list(&filter).await?;
        Envelope::ok(orgs)
    }

    async fn update(&self, req: UpdateOrganization) -> ServiceResult {
        let changes = req.patch.into_changes()?;
        update_and_reload::<Organization>(&*self.store, &Self::by_id(&req.org), &changes).await
    }

    async fn delete(&self, req: OrgParams) -> Result<(), ServiceError> {
        self.store.delete::<Organization>(&Self::by_id(&req.org)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgdesk_infra::storage::InMemoryStore;

    async fn service() -> OrganizationService {
        let store: Arc<dyn Storer> = Arc::new(InMemoryStore::new());
        store.migrate(&orgdesk_account::schemas()).await.unwrap();
        OrganizationService::new(store)
    }

    fn acme() -> NewOrganization {
        NewOrganization {
            name: "Acme".into(),
            email: "a@acme.io".into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let svc = service().await;
        let created = svc.create(acme()).await.unwrap();
        assert_eq!(created.status, 200);
        let id = created.data["uuid"].as_str().unwrap().to_string();

        let fetched = svc.get(OrgParams { org: id }).await.unwrap();
        assert_eq!(fetched.data, created.data);
    }

    #[tokio::test]
    async fn blank_organization_is_rejected() {
        let svc = service().await;
        let err = svc.create(NewOrganization::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let listed = svc.list(ListOrganizations {}, Filter::unscoped()).await.unwrap();
        assert_eq!(listed.data, serde_json::json!([]));
    }

    #[tokio::test]
    async fn get_with_malformed_id_is_not_found() {
        let svc = service().await;
        let err = svc.get(OrgParams { org: "bad-uuid".into() }).await.unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }

    #[tokio::test]
    async fn update_returns_reloaded_record() {
        let svc = service().await;
        let created = svc.create(acme()).await.unwrap();
        let id = created.data["uuid"].as_str().unwrap().to_string();

        let patch: OrganizationPatch = serde_json::from_str(r#"{"phone":"555"}"#).unwrap();
        let updated = svc.update(UpdateOrganization { org: id, patch }).await.unwrap();
        assert_eq!(updated.data["phone"], "555");
        assert_eq!(updated.data["name"], "Acme");
    }

    #[tokio::test]
    async fn deleted_organizations_disappear() {
        let svc = service().await;
        let created = svc.create(acme()).await.unwrap();
        let id = created.data["uuid"].as_str().unwrap().to_string();

        svc.delete(OrgParams { org: id.clone() }).await.unwrap();
        assert_eq!(svc.get(OrgParams { org: id }).await.unwrap_err(), ServiceError::NotFound);
        let listed = svc.list(ListOrganizations {}, Filter::unscoped()).await.unwrap();
        assert_eq!(listed.data, serde_json::json!([]));
    }
}
