//! Integration tests for Paste Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p paste-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `categories` - Palette initialization, limits, recolor, deletion
//! - `lists_and_items` - Subscriptions, mutations, atomic removal
//! - `detail_view` - Grouping driven by both feeds
//!
//! Every test runs against an in-process [`MemoryStore`], so no external
//! services are needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use paste_shop_core::{ItemDraft, ListId, ListItem, UserId};
use paste_shop_sync::{MemoryStore, SyncClient, SyncConfig};

/// A client over a fresh in-memory store, acting as one user.
pub struct TestContext {
    pub memory: MemoryStore,
    pub client: SyncClient,
    pub user: UserId,
}

impl TestContext {
    /// Fresh store with default limits and a 3 second notice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SyncConfig {
            notice_ttl: Duration::from_secs(3),
            ..SyncConfig::default()
        })
    }

    #[must_use]
    pub fn with_config(config: SyncConfig) -> Self {
        let memory = MemoryStore::new();
        let client = SyncClient::new(config, Arc::new(memory.clone()));
        Self {
            memory,
            client,
            user: UserId::new("alice"),
        }
    }

    /// Create a list owned by the context user.
    ///
    /// # Panics
    ///
    /// Panics if the store rejects the write.
    pub async fn list(&self, name: &str) -> ListId {
        match self.client.lists().create_list(&self.user, name).await {
            Ok(list) => list.id,
            Err(e) => panic!("failed to create list {name}: {e}"),
        }
    }

    /// Add an item to `list`.
    ///
    /// # Panics
    ///
    /// Panics if validation or the write fails.
    pub async fn item(&self, list: &ListId, name: &str, category: &str) -> ListItem {
        match self
            .client
            .mutations()
            .add_item(list, ItemDraft::new(name, 1, category))
            .await
        {
            Ok(item) => item,
            Err(e) => panic!("failed to add item {name}: {e}"),
        }
    }

    /// Items currently stored for `list`, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the list cannot be read.
    pub async fn items(&self, list: &ListId) -> Vec<ListItem> {
        let mut feed = self.client.items().subscribe(&self.user, list);
        match feed.wait_for(|s| s.value.items_loaded).await {
            Some(state) => state.value.items,
            None => panic!("item feed for {list} ended before loading"),
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
