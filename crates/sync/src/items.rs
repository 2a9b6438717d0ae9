//! Live view of one shopping list: its metadata and its items.
//!
//! The metadata read and the item listener run side by side. Whichever fails
//! first decides the error shown; neither failure stops the other branch.
//! When the requesting user does not own the list, the name and items are
//! withheld.

use paste_shop_core::{ListId, ListItem, ShoppingList, UserId};
use tracing::{debug, error, instrument, warn};

use crate::error::{Result, SyncError};
use crate::feed::{Feed, FeedState};
use crate::paths;
use crate::store::{Direction, Document, Query, SharedStore};

pub(crate) const ADDED_AT_FIELD: &str = "addedAt";
pub(crate) const IS_DONE_FIELD: &str = "isDone";

/// What a list detail screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshot {
    /// List metadata, once read and only if the user owns the list.
    pub list: Option<ShoppingList>,
    /// Items ordered by `addedAt`, oldest first.
    pub items: Vec<ListItem>,
    /// Whether the metadata read has finished (successfully or not).
    pub metadata_loaded: bool,
    /// Whether the item listener has delivered a snapshot or failed.
    pub items_loaded: bool,
}

impl ListSnapshot {
    /// The list's display name, if available.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.list.as_ref().map(|list| list.name.as_str())
    }

    /// Whether any item is marked done.
    #[must_use]
    pub fn has_completed_items(&self) -> bool {
        self.items.iter().any(|item| item.is_done)
    }
}

/// Watches list items.
#[derive(Clone)]
pub struct ItemStore {
    store: SharedStore,
}

impl ItemStore {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Read a list's metadata on behalf of `user`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ListNotFound`] if the list does not exist
    /// - [`SyncError::PermissionDenied`] if `user` is not the owner
    /// - [`SyncError::Transport`] if the read fails or the document is malformed
    #[instrument(skip(self))]
    pub async fn list_metadata(&self, user: &UserId, list: &ListId) -> Result<ShoppingList> {
        fetch_metadata(&self.store, user, list).await
    }

    /// Watch a list's metadata and items on behalf of `user`.
    #[must_use]
    pub fn subscribe(&self, user: &UserId, list: &ListId) -> Feed<ListSnapshot> {
        let store = self.store.clone();
        let user = user.clone();
        let list = list.clone();

        Feed::spawn(
            FeedState::loading(ListSnapshot::default()),
            move |tx| async move {
                let metadata = async {
                    let result = fetch_metadata(&store, &user, &list).await;
                    tx.send_modify(|state| {
                        match result {
                            Ok(meta) => state.value.list = Some(meta),
                            Err(e) => {
                                if matches!(e, SyncError::PermissionDenied(_)) {
                                    state.value.items.clear();
                                }
                                state.value.list = None;
                                state.error.get_or_insert(e);
                            }
                        }
                        state.value.metadata_loaded = true;
                        state.loading = !state.value.items_loaded && state.error.is_none();
                    });
                };

                let items = async {
                    let query = Query::new(paths::items(&list))
                        .order_by(ADDED_AT_FIELD, Direction::Ascending);
                    let mut stream = store.listen_query(&query);
                    while let Some(snapshot) = stream.next().await {
                        match snapshot {
                            Ok(docs) => {
                                let decoded = decode_items(&docs);
                                tx.send_modify(|state| {
                                    let denied =
                                        matches!(state.error, Some(SyncError::PermissionDenied(_)));
                                    if !denied {
                                        state.value.items = decoded;
                                    }
                                    state.value.items_loaded = true;
                                    state.loading = false;
                                });
                            }
                            Err(e) => {
                                error!(list_id = %list, error = %e, "Item listener failed");
                                tx.send_modify(|state| {
                                    state.error.get_or_insert(e.into());
                                    state.value.items_loaded = true;
                                    state.loading = false;
                                });
                                break;
                            }
                        }
                    }
                    debug!(list_id = %list, "Item listener finished");
                };

                tokio::join!(metadata, items);
            },
        )
    }
}

impl std::fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStore").finish_non_exhaustive()
    }
}

async fn fetch_metadata(
    store: &SharedStore,
    user: &UserId,
    list: &ListId,
) -> Result<ShoppingList> {
    let doc = store.get(&paths::list(list)).await.inspect_err(|e| {
        error!(list_id = %list, error = %e, "Failed to read list");
    })?;
    let Some(doc) = doc else {
        return Err(SyncError::ListNotFound(list.clone()));
    };

    let meta: ShoppingList = doc
        .decode()
        .inspect_err(|e| warn!(list_id = %list, error = %e, "Malformed list document"))?;
    if &meta.owner_id != user {
        warn!(list_id = %list, %user, "List read by non-owner");
        return Err(SyncError::PermissionDenied(list.clone()));
    }
    Ok(meta)
}

/// Decode item documents, skipping any that are malformed.
pub(crate) fn decode_items(docs: &[Document]) -> Vec<ListItem> {
    docs.iter()
        .filter_map(|doc| {
            doc.decode::<ListItem>()
                .inspect_err(|e| warn!(error = %e, "Skipping malformed item document"))
                .ok()
        })
        .collect()
}
