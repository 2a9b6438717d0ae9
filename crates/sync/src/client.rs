//! Sync client shared across the application.

use std::sync::Arc;

use crate::categories::CategoryStore;
use crate::config::SyncConfig;
use crate::items::ItemStore;
use crate::lists::ListStore;
use crate::mutations::MutationGateway;
use crate::notice::Notice;
use crate::store::SharedStore;

/// Every sync component, wired to one document store.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<SyncClientInner>,
}

struct SyncClientInner {
    config: SyncConfig,
    store: SharedStore,
    categories: CategoryStore,
    lists: ListStore,
    items: ItemStore,
    mutations: MutationGateway,
    notice: Notice,
}

impl SyncClient {
    /// Create a client over `store`.
    ///
    /// # Arguments
    ///
    /// * `config` - Sync configuration
    /// * `store` - Document store every component reads and writes
    #[must_use]
    pub fn new(config: SyncConfig, store: SharedStore) -> Self {
        let notice = Notice::new(config.notice_ttl);
        let categories = CategoryStore::new(store.clone(), config.max_custom_categories);
        let lists = ListStore::new(store.clone());
        let items = ItemStore::new(store.clone());
        let mutations = MutationGateway::new(store.clone(), notice.clone());

        Self {
            inner: Arc::new(SyncClientInner {
                config,
                store,
                categories,
                lists,
                items,
                mutations,
                notice,
            }),
        }
    }

    /// Get a reference to the sync configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Get a reference to the underlying document store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    /// Get a reference to the category store.
    #[must_use]
    pub fn categories(&self) -> &CategoryStore {
        &self.inner.categories
    }

    /// Get a reference to the list store.
    #[must_use]
    pub fn lists(&self) -> &ListStore {
        &self.inner.lists
    }

    /// Get a reference to the item store.
    #[must_use]
    pub fn items(&self) -> &ItemStore {
        &self.inner.items
    }

    /// Get a reference to the mutation gateway.
    #[must_use]
    pub fn mutations(&self) -> &MutationGateway {
        &self.inner.mutations
    }

    /// Get a reference to the shared error notice.
    #[must_use]
    pub fn notice(&self) -> &Notice {
        &self.inner.notice
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use paste_shop_core::{ItemId, ListId, UserId};

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_components_share_one_store_and_notice() {
        let memory = MemoryStore::new();
        let config = SyncConfig {
            max_custom_categories: 2,
            notice_ttl: Duration::from_secs(5),
        };
        let client = SyncClient::new(config, Arc::new(memory.clone()));

        assert_eq!(client.categories().max_custom(), 2);
        assert_eq!(client.notice().ttl(), Duration::from_secs(5));

        client.lists().create_list(&UserId::new("u1"), "Weekly").await.unwrap();
        assert_eq!(memory.document_count(), 1);

        memory.fail_writes(true);
        let _ = client
            .mutations()
            .toggle_done(&ListId::new("l1"), &ItemId::new("i1"), false)
            .await;
        assert!(client.notice().current().is_some());
    }
}
