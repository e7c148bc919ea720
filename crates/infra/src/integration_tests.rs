//! Typed storage tests: `RecordStore` over the in-memory backend.
//!
//! Verifies:
//! - create assigns fresh identifiers and timestamps
//! - create-then-get round-trips
//! - scoped listing never leaks another parent's records

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use orgdesk_core::{
        Changes, Column, DomainResult, Field, Record, RecordId, RecordMeta, RecordSchema, Row,
    };
    use proptest::prelude::*;

    use crate::storage::{Filter, InMemoryStore, RecordStore, StorageError, Storer};

    #[derive(Debug, Clone, PartialEq)]
    struct Owner {
        meta: RecordMeta,
        name: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        meta: RecordMeta,
        label: String,
        owner: RecordId,
    }

    static OWNER_COLUMNS: [Column; 1] = [Column::text("name")];
    static OWNERS: RecordSchema = RecordSchema::new("owners", &OWNER_COLUMNS);

    static ITEM_COLUMNS: [Column; 2] = [
        Column::text("label"),
        Column::uuid("owner_uuid").references("owners"),
    ];
    static ITEMS: RecordSchema = RecordSchema::new("items", &ITEM_COLUMNS).scoped_by("owner_uuid");

    impl Record for Owner {
        fn schema() -> &'static RecordSchema {
            &OWNERS
        }
        fn meta(&self) -> &RecordMeta {
            &self.meta
        }
        fn meta_mut(&mut self) -> &mut RecordMeta {
            &mut self.meta
        }
        fn to_row(&self) -> Row {
            Row::new().with("name", self.name.as_str())
        }
        fn from_row(meta: RecordMeta, row: &Row) -> DomainResult<Self> {
            Ok(Self {
                meta,
                name: row.text("name")?,
            })
        }
    }

    impl Record for Item {
        fn schema() -> &'static RecordSchema {
            &ITEMS
        }
        fn meta(&self) -> &RecordMeta {
            &self.meta
        }
        fn meta_mut(&mut self) -> &mut RecordMeta {
            &mut self.meta
        }
        fn to_row(&self) -> Row {
            Row::new()
                .with("label", self.label.as_str())
                .with("owner_uuid", self.owner)
        }
        fn from_row(meta: RecordMeta, row: &Row) -> DomainResult<Self> {
            Ok(Self {
                meta,
                label: row.text("label")?,
                owner: row.record_id("owner_uuid")?,
            })
        }
    }

    async fn setup() -> Arc<dyn Storer> {
        let store: Arc<dyn Storer> = Arc::new(InMemoryStore::new());
        store.migrate(&[&OWNERS, &ITEMS]).await.unwrap();
        store
    }

    async fn owner(store: &Arc<dyn Storer>, name: &str) -> RecordId {
        let mut owner = Owner {
            meta: RecordMeta::default(),
            name: name.to_string(),
        };
        store.create(&mut owner).await.unwrap();
        owner.meta.uuid.unwrap()
    }

    fn item(owner: RecordId, label: &str) -> Item {
        Item {
            meta: RecordMeta::default(),
            label: label.to_string(),
            owner,
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids_and_timestamps() {
        let store = setup().await;
        let a = owner(&store, "a").await;
        let b = owner(&store, "b").await;
        assert_ne!(a, b);

        let fetched: Owner = store.get(&Filter::unscoped().eq("uuid", a.to_string())).await.unwrap();
        assert!(fetched.meta.created_at.is_some());
        assert_eq!(fetched.meta.created_at, fetched.meta.updated_at);
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = setup().await;
        let org = owner(&store, "acme").await;
        let mut created = item(org, "red");
        assert_eq!(store.create(&mut created).await.unwrap(), 1);

        let id = created.meta.uuid.unwrap();
        let fetched: Item = store
            .get(&Filter::scoped("owner_uuid", org).eq("uuid", id.to_string()))
            .await
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn failed_create_leaves_record_untouched() {
        let store = setup().await;
        let mut orphan = item(RecordId::new(), "lost");
        let err = store.create(&mut orphan).await.unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)));
        assert!(orphan.meta.uuid.is_none());
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = setup().await;
        let err = store
            .get::<Owner>(&Filter::unscoped().eq("uuid", RecordId::new().to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::NotFound);
        assert_eq!(err.to_string(), "record not found");
    }

    #[tokio::test]
    async fn repeated_lists_are_identical() {
        let store = setup().await;
        let org = owner(&store, "acme").await;
        for label in ["a", "b", "c"] {
            store.create(&mut item(org, label)).await.unwrap();
        }

        let scope = Filter::scoped("owner_uuid", org);
        let first: Vec<Item> = store.list(&scope).await.unwrap();
        let second: Vec<Item> = store.list(&scope).await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_then_get_sees_changes() {
        let store = setup().await;
        let org = owner(&store, "acme").await;
        let mut created = item(org, "red");
        store.create(&mut created).await.unwrap();
        let id = created.meta.uuid.unwrap();

        let filter = Filter::scoped("owner_uuid", org).eq("uuid", id.to_string());
        let changes = Changes::new().field("label", Field::Set("blue".to_string()));
        assert_eq!(store.update::<Item>(&filter, &changes).await.unwrap(), 1);

        let fetched: Item = store.get(&filter).await.unwrap();
        assert_eq!(fetched.label, "blue");
        assert!(fetched.meta.updated_at >= created.meta.updated_at);
    }

    #[tokio::test]
    async fn delete_with_zero_matches_is_ok() {
        let store = setup().await;
        let org = owner(&store, "acme").await;
        let filter = Filter::scoped("owner_uuid", org).eq("uuid", "not-a-uuid");
        assert_eq!(store.delete::<Item>(&filter).await.unwrap(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: listing under one owner only returns that owner's items.
        #[test]
        fn scoped_list_only_returns_owned_records(
            placements in prop::collection::vec(0usize..3, 0..20)
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let store = setup().await;
                let mut owners = Vec::new();
                for name in ["x", "y", "z"] {
                    owners.push(owner(&store, name).await);
                }
                for (i, slot) in placements.iter().enumerate() {
                    store.create(&mut item(owners[*slot], &format!("item-{i}"))).await.unwrap();
                }

                for (slot, owner_id) in owners.iter().enumerate() {
                    let listed: Vec<Item> = store.list(&Filter::scoped("owner_uuid", *owner_id)).await.unwrap();
                    let expected = placements.iter().filter(|s| **s == slot).count();
                    prop_assert_eq!(listed.len(), expected);
                    prop_assert!(listed.iter().all(|it| it.owner == *owner_id));
                }
                Ok(())
            })?;
        }
    }
}
