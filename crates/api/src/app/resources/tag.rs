use std::sync::Arc;

use async_trait::async_trait;
use orgdesk_infra::storage::{Filter, RecordStore, Storer};
use orgdesk_tags::{NewTag, Tag, TagPatch};
use serde::Deserialize;
use tracing::debug;

use super::{ORG_SCOPE, in_org, parent_id, update_and_reload};
use crate::generic::{Envelope, Request, ResourceService, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
pub struct CreateTag {
    pub org: String,
    #[serde(flatten)]
    pub tag: NewTag,
}

impl Request for CreateTag {}

/// `/organization/:org/tag/:tag`
#[derive(Debug, Deserialize)]
pub struct TagParams {
    pub org: String,
    pub tag: String,
}

impl Request for TagParams {
    fn id(&self) -> Option<&str> {
        Some(&self.tag)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListTags {
    pub org: String,
}

impl Request for ListTags {}

#[derive(Debug, Deserialize)]
pub struct UpdateTag {
    pub org: String,
    pub tag: String,
    #[serde(flatten)]
    pub patch: TagPatch,
}

impl Request for UpdateTag {
    fn id(&self) -> Option<&str> {
        Some(&self.tag)
    }
}

pub struct TagService {
    store: Arc<dyn Storer>,
}

impl TagService {
    pub fn new(store: Arc<dyn Storer>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResourceService for TagService {
    type Create = CreateTag;
    type Get = TagParams;
    type List = ListTags;
    type Update = UpdateTag;
    type Delete = TagParams;

    fn name(&self) -> &'static str {
        "organization/:org/tag"
    }

    fn path_params(&self) -> &'static [&'static str] {
        &["tag"]
    }

    async fn create(&self, req: CreateTag) -> ServiceResult {
        let mut tag = req.tag.into_tag(parent_id(&req.org)?)?;
        self.store.create(&mut tag).await?;
        Envelope::ok(tag)
    }

    async fn get(&self, req: TagParams) -> ServiceResult {
        let tag: Tag = self.store.get(&in_org(&req.org, &req.tag)).await?;
        Envelope::ok(tag)
    }

    async fn list(&self, req: ListTags, filter: Filter) -> ServiceResult {
        let filter = filter.scoped_to(ORG_SCOPE, &req.org);
        debug!(resource = "tag", ?filter, "list");
        let tags: Vec<Tag> = self.store.list(&filter).await?;
        Envelope::ok(tags)
    }

    async fn update(&self, req: UpdateTag) -> ServiceResult {
        let changes = req.patch.into_changes()?;
        update_and_reload::<Tag>(&*self.store, &in_org(&req.org, &req.tag), &changes).await
    }

    async fn delete(&self, req: TagParams) -> Result<(), ServiceError> {
        self.store.delete::<Tag>(&in_org(&req.org, &req.tag)).await?;
        Ok(())
    }
}
