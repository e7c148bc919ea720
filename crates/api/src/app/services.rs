//! Infrastructure wiring: storage backend selection, migrations and the
//! resource services built on top of them.

use std::sync::Arc;

use orgdesk_infra::config::Config;
use orgdesk_infra::storage::{InMemoryStore, PostgresStore, StorageError, StorageResult, Storer};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use super::resources::{OrganizationService, TagService, UserService};

const MAX_DB_CONNECTIONS: u32 = 10;

/// Shared handles for the mounted resources.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn Storer>,
    pub organizations: Arc<OrganizationService>,
    pub users: Arc<UserService>,
    pub tags: Arc<TagService>,
}

impl AppServices {
    pub fn new(store: Arc<dyn Storer>) -> Self {
        Self {
            organizations: Arc::new(OrganizationService::new(store.clone())),
            users: Arc::new(UserService::new(store.clone())),
            tags: Arc::new(TagService::new(store.clone())),
            store,
        }
    }
}

/// Postgres when a database host is configured, otherwise the in-memory store.
pub async fn build_store(config: &Config) -> StorageResult<Arc<dyn Storer>> {
    let Some(options) = config.pg_connect_options() else {
        warn!("ORGDESK_DB_HOST not set; using in-memory store (data is lost on exit)");
        return Ok(Arc::new(InMemoryStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::Persistence(format!("connect failed: {e}")))?;
    info!(host = ?config.db_host, db = %config.db_name, "connected to postgres");
    Ok(Arc::new(PostgresStore::new(pool)))
}

/// Ensure every resource table exists, parents first.
pub async fn migrate(store: &dyn Storer) -> StorageResult<()> {
    store.migrate(&orgdesk_account::schemas()).await?;
    store.migrate(&orgdesk_tags::schemas()).await?;
    info!("migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgdesk_account::NewOrganization;
    use orgdesk_infra::storage::RecordStore;

    #[tokio::test]
    async fn without_database_host_falls_back_to_memory() {
        let store = build_store(&Config::default()).await.unwrap();
        migrate(&*store).await.unwrap();

        let mut org = NewOrganization {
            name: "Acme".into(),
            email: "a@acme.io".into(),
            phone: None,
        }
        .into_organization()
        .unwrap();
        assert_eq!(store.create(&mut org).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn migrations_are_repeatable() {
        let services = AppServices::new(Arc::new(InMemoryStore::new()));
        migrate(&*services.store).await.unwrap();
        migrate(&*services.store).await.unwrap();
    }
}
