//! A user's shopping lists.

use chrono::{SubsecRound, Utc};
use paste_shop_core::{ListId, NewList, ShoppingList, UserId};
use tracing::{error, info, instrument, warn};

use crate::error::Result;
use crate::feed::{Feed, FeedState};
use crate::paths;
use crate::store::{Direction, Document, Query, SharedStore, to_fields};

const OWNER_FIELD: &str = "ownerId";
const CREATED_AT_FIELD: &str = "createdAt";

/// Watches and creates shopping lists.
#[derive(Clone)]
pub struct ListStore {
    store: SharedStore,
}

impl ListStore {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Watch the lists owned by `user`, newest first.
    ///
    /// With no user the feed is immediately empty and not loading. A
    /// listener failure leaves an empty list plus the error, which callers
    /// can tell apart from a user who simply has no lists.
    #[must_use]
    pub fn subscribe(&self, user: Option<&UserId>) -> Feed<Vec<ShoppingList>> {
        let Some(user) = user else {
            return Feed::fixed(FeedState::ready(Vec::new()));
        };

        let store = self.store.clone();
        let query = Query::new(paths::lists())
            .where_eq(OWNER_FIELD, user.as_str())
            .order_by(CREATED_AT_FIELD, Direction::Descending);
        let user = user.clone();
        Feed::spawn(FeedState::loading(Vec::new()), move |tx| async move {
            let mut stream = store.listen_query(&query);
            while let Some(snapshot) = stream.next().await {
                match snapshot {
                    Ok(docs) => {
                        tx.send_replace(FeedState::ready(decode_lists(&docs)));
                    }
                    Err(e) => {
                        error!(%user, error = %e, "List listener failed");
                        tx.send_replace(FeedState::failed(Vec::new(), e.into()));
                        break;
                    }
                }
            }
        })
    }

    /// Create a list named `name` owned by `user`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Validation`] if the trimmed name is empty
    /// - [`SyncError::Transport`] if the write fails
    ///
    /// [`SyncError::Validation`]: crate::SyncError::Validation
    /// [`SyncError::Transport`]: crate::SyncError::Transport
    #[instrument(skip(self))]
    pub async fn create_list(&self, user: &UserId, name: &str) -> Result<ShoppingList> {
        // Stored timestamps have microsecond precision.
        let new_list = NewList::new(user.clone(), name, Utc::now().trunc_subsecs(6))?;
        let fields = to_fields(&new_list)?;

        let path = self
            .store
            .create(&paths::lists(), fields)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create list"))?;

        let list = ShoppingList {
            id: ListId::new(path.id()),
            name: new_list.name,
            owner_id: new_list.owner_id,
            created_at: new_list.created_at,
        };
        info!(list_id = %list.id, "List created");
        Ok(list)
    }
}

impl std::fmt::Debug for ListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListStore").finish_non_exhaustive()
    }
}

/// Decode list documents, skipping any that are malformed.
fn decode_lists(docs: &[Document]) -> Vec<ShoppingList> {
    docs.iter()
        .filter_map(|doc| {
            doc.decode::<ShoppingList>()
                .inspect_err(|e| warn!(error = %e, "Skipping malformed list document"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::error::SyncError;
    use crate::store::{DocumentStore, Fields, MemoryStore};

    fn setup() -> (MemoryStore, ListStore) {
        let memory = MemoryStore::new();
        let lists = ListStore::new(Arc::new(memory.clone()));
        (memory, lists)
    }

    fn list_fields(name: &str, owner: &str, created_at: i64) -> Fields {
        match json!({"name": name, "ownerId": owner, "createdAt": created_at}) {
            serde_json::Value::Object(fields) => fields,
            _ => Fields::new(),
        }
    }

    #[tokio::test]
    async fn test_no_user_is_empty_and_not_loading() {
        let (_, lists) = setup();
        let state = lists.subscribe(None).state();
        assert!(!state.loading);
        assert!(state.value.is_empty());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_only_owned_lists_newest_first() {
        let (memory, lists) = setup();
        let coll = paths::lists();
        memory.set(&coll.doc("old"), list_fields("Old", "u1", 100)).await.unwrap();
        memory.set(&coll.doc("new"), list_fields("New", "u1", 300)).await.unwrap();
        memory.set(&coll.doc("theirs"), list_fields("Theirs", "u2", 200)).await.unwrap();

        let mut feed = lists.subscribe(Some(&UserId::new("u1")));
        let names: Vec<_> = feed.loaded().await.value.into_iter().map(|l| l.name).collect();
        assert_eq!(names, ["New", "Old"]);
    }

    #[tokio::test]
    async fn test_malformed_list_is_skipped() {
        let (memory, lists) = setup();
        let coll = paths::lists();
        memory.set(&coll.doc("good"), list_fields("Good", "u1", 1)).await.unwrap();
        let mut bad = list_fields("Bad", "u1", 2);
        bad.insert("name".to_owned(), json!(42));
        memory.set(&coll.doc("bad"), bad).await.unwrap();

        let mut feed = lists.subscribe(Some(&UserId::new("u1")));
        let state = feed.loaded().await;
        assert_eq!(state.value.len(), 1);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_create_list_is_observed() {
        let (_, lists) = setup();
        let user = UserId::new("u1");
        let mut feed = lists.subscribe(Some(&user));
        feed.loaded().await;

        let created = lists.create_list(&user, "  Weekly shop ").await.unwrap();
        assert_eq!(created.name, "Weekly shop");

        let state = feed.wait_for(|s| !s.value.is_empty()).await.unwrap();
        assert_eq!(state.value, vec![created]);
    }

    #[tokio::test]
    async fn test_create_list_blank_name_never_writes() {
        let (memory, lists) = setup();
        let result = lists.create_list(&UserId::new("u1"), "   ").await;
        assert!(matches!(result, Err(SyncError::Validation(_))));
        assert_eq!(memory.write_count(), 0);
    }

    #[tokio::test]
    async fn test_listener_failure_is_distinct_from_empty() {
        let (memory, lists) = setup();
        let mut feed = lists.subscribe(Some(&UserId::new("u1")));
        assert!(feed.loaded().await.error.is_none());

        memory.break_listeners("offline");
        let state = feed.wait_for(|s| s.error.is_some()).await.unwrap();
        assert!(state.value.is_empty());
        assert!(matches!(state.error, Some(SyncError::Transport(_))));
    }
}
