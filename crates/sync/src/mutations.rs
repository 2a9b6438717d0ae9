//! Item writes.
//!
//! Input is validated before anything reaches the store. Feeds pick the
//! results up as their next snapshot; nothing here patches local state.
//!
//! Toggling an item and clearing completed items report failures through the
//! shared [`Notice`] as well as the returned error, since those actions have
//! no form to show the error next to.

use chrono::{SubsecRound, Utc};
use paste_shop_core::{ItemDraft, ItemId, ItemPatch, ListId, ListItem};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::error::{Result, SyncError};
use crate::items::IS_DONE_FIELD;
use crate::notice::Notice;
use crate::paths;
use crate::store::{DocumentUpdate, Query, SharedStore, WriteBatch, to_fields};

/// Creates, edits, and deletes list items.
#[derive(Clone)]
pub struct MutationGateway {
    store: SharedStore,
    notice: Notice,
}

impl MutationGateway {
    #[must_use]
    pub fn new(store: SharedStore, notice: Notice) -> Self {
        Self { store, notice }
    }

    /// The notice failures are flashed to.
    #[must_use]
    pub const fn notice(&self) -> &Notice {
        &self.notice
    }

    /// Add a new, not-done item to a list.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Validation`] for a blank name or non-positive quantity
    /// - [`SyncError::Transport`] if the write fails
    #[instrument(skip(self))]
    pub async fn add_item(&self, list: &ListId, draft: ItemDraft) -> Result<ListItem> {
        // Stored timestamps have microsecond precision.
        let new_item = draft.validate(Utc::now().trunc_subsecs(6))?;
        let fields = to_fields(&new_item)?;

        let path = self
            .store
            .create(&paths::items(list), fields)
            .await
            .inspect_err(|e| error!(list_id = %list, error = %e, "Failed to add item"))?;

        let item = ListItem {
            id: ItemId::new(path.id()),
            name: new_item.name,
            quantity: new_item.quantity,
            category: new_item.category,
            added_at: new_item.added_at,
            is_done: new_item.is_done,
        };
        info!(list_id = %list, item_id = %item.id, "Item added");
        Ok(item)
    }

    /// Flip an item's done flag from `current`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] if the write fails; the error is also
    /// flashed to the notice.
    #[instrument(skip(self))]
    pub async fn toggle_done(&self, list: &ListId, item: &ItemId, current: bool) -> Result<()> {
        let update = DocumentUpdate::new().set(IS_DONE_FIELD, !current);
        match self.store.update(&paths::item(list, item), update).await {
            Ok(()) => {
                info!(is_done = !current, "Item toggled");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to toggle item");
                let err = SyncError::from(e);
                self.notice.flash(err.clone());
                Err(err)
            }
        }
    }

    /// Write the supplied fields of `patch` to an item.
    ///
    /// An empty patch writes nothing.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Validation`] for a supplied blank name or non-positive quantity
    /// - [`SyncError::Transport`] if the write fails
    #[instrument(skip(self))]
    pub async fn save_item(&self, list: &ListId, item: &ItemId, patch: ItemPatch) -> Result<()> {
        let patch = patch.validate()?;
        if patch.is_empty() {
            return Ok(());
        }

        let update = DocumentUpdate::from(to_fields(&patch)?);
        self.store
            .update(&paths::item(list, item), update)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to save item"))?;

        info!("Item saved");
        Ok(())
    }

    /// Delete one item.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, list: &ListId, item: &ItemId) -> Result<()> {
        self.store
            .delete(&paths::item(list, item))
            .await
            .inspect_err(|e| error!(error = %e, "Failed to delete item"))?;

        info!("Item deleted");
        Ok(())
    }

    /// Delete every done item of a list in one atomic batch.
    ///
    /// Returns how many items were removed; `0` when none were done.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] if the query or commit fails, in which
    /// case no item is deleted. The error is also flashed to the notice.
    #[instrument(skip(self))]
    pub async fn remove_completed_items(&self, list: &ListId) -> Result<usize> {
        self.try_remove_completed(list).await.inspect_err(|e| {
            error!(error = %e, "Failed to remove completed items");
            self.notice.flash(e.clone());
        })
    }

    async fn try_remove_completed(&self, list: &ListId) -> Result<usize> {
        let query = Query::new(paths::items(list)).where_eq(IS_DONE_FIELD, Value::Bool(true));
        let done = self.store.query(&query).await?;
        if done.is_empty() {
            info!("No completed items to remove");
            return Ok(0);
        }

        let mut batch = WriteBatch::new();
        for doc in done {
            batch.delete(doc.path);
        }
        let removed = batch.len();
        self.store.commit(batch).await?;

        info!(removed, "Completed items removed");
        Ok(removed)
    }
}

impl std::fmt::Debug for MutationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationGateway")
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use paste_shop_core::ValidationError;

    use super::*;
    use crate::items::decode_items;
    use crate::store::{DocumentStore, MemoryStore};

    fn setup() -> (MemoryStore, MutationGateway) {
        let memory = MemoryStore::new();
        let gateway = MutationGateway::new(
            Arc::new(memory.clone()),
            Notice::new(Duration::from_secs(3)),
        );
        (memory, gateway)
    }

    async fn stored_items(memory: &MemoryStore, list: &ListId) -> Vec<ListItem> {
        let docs = memory.query(&Query::new(paths::items(list))).await.unwrap();
        decode_items(&docs)
    }

    #[tokio::test]
    async fn test_add_item_writes_trimmed_fields() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");

        let item = gateway
            .add_item(&list, ItemDraft::new("  Milk ", 2, " Dairy "))
            .await
            .unwrap();
        assert_eq!(item.name, "Milk");
        assert_eq!(item.category, "Dairy");
        assert!(!item.is_done);

        assert_eq!(stored_items(&memory, &list).await, vec![item]);
    }

    #[tokio::test]
    async fn test_add_item_rejects_empty_name_without_writing() {
        let (memory, gateway) = setup();
        let result = gateway
            .add_item(&ListId::new("l1"), ItemDraft::new("", 1, ""))
            .await;
        assert_eq!(
            result,
            Err(SyncError::Validation(ValidationError::EmptyItemName))
        );
        assert_eq!(memory.write_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_done_flips_flag() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");
        let item = gateway.add_item(&list, ItemDraft::new("Eggs", 12, "")).await.unwrap();

        gateway.toggle_done(&list, &item.id, false).await.unwrap();
        assert!(stored_items(&memory, &list).await[0].is_done);

        gateway.toggle_done(&list, &item.id, true).await.unwrap();
        assert!(!stored_items(&memory, &list).await[0].is_done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_failure_flashes_notice() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");
        let item = gateway.add_item(&list, ItemDraft::new("Eggs", 12, "")).await.unwrap();
        memory.fail_writes(true);

        let err = gateway.toggle_done(&list, &item.id, false).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(gateway.notice().current(), Some(err));

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert!(gateway.notice().current().is_none());
    }

    #[tokio::test]
    async fn test_save_item_writes_only_supplied_fields() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");
        let item = gateway.add_item(&list, ItemDraft::new("Tea", 1, "beverages")).await.unwrap();
        gateway.toggle_done(&list, &item.id, false).await.unwrap();

        let patch = ItemPatch {
            quantity: Some(3),
            ..ItemPatch::default()
        };
        gateway.save_item(&list, &item.id, patch).await.unwrap();

        let saved = &stored_items(&memory, &list).await[0];
        assert_eq!(saved.quantity, 3);
        assert_eq!(saved.name, "Tea");
        assert_eq!(saved.category, "beverages");
        assert!(saved.is_done);
        assert_eq!(saved.added_at, item.added_at);
    }

    #[tokio::test]
    async fn test_save_item_round_trip() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");
        let item = gateway.add_item(&list, ItemDraft::new("Tea", 1, "")).await.unwrap();

        gateway
            .save_item(&list, &item.id, ItemPatch::full(" Green tea ", 2, "Beverages"))
            .await
            .unwrap();

        let saved = &stored_items(&memory, &list).await[0];
        assert_eq!(
            (saved.name.as_str(), saved.quantity, saved.category.as_str()),
            ("Green tea", 2, "Beverages")
        );
    }

    #[tokio::test]
    async fn test_save_item_validation_and_empty_patch() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");
        let item = ItemId::new("i1");

        let bad = ItemPatch {
            quantity: Some(0),
            ..ItemPatch::default()
        };
        assert!(gateway.save_item(&list, &item, bad).await.is_err());
        gateway.save_item(&list, &item, ItemPatch::default()).await.unwrap();
        assert_eq!(memory.write_count(), 0);
    }

    #[tokio::test]
    async fn test_save_missing_item_fails() {
        let (_, gateway) = setup();
        let result = gateway
            .save_item(&ListId::new("l1"), &ItemId::new("ghost"), ItemPatch::full("x", 1, ""))
            .await;
        assert!(matches!(result, Err(SyncError::Transport(_))));
    }

    #[tokio::test]
    async fn test_delete_item() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");
        let item = gateway.add_item(&list, ItemDraft::new("Salt", 1, "")).await.unwrap();

        gateway.delete_item(&list, &item.id).await.unwrap();
        assert!(stored_items(&memory, &list).await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_completed_items() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d"] {
            ids.push(gateway.add_item(&list, ItemDraft::new(name, 1, "")).await.unwrap().id);
        }
        gateway.toggle_done(&list, &ids[0], false).await.unwrap();
        gateway.toggle_done(&list, &ids[2], false).await.unwrap();

        assert_eq!(gateway.remove_completed_items(&list).await.unwrap(), 2);

        let mut remaining: Vec<_> = stored_items(&memory, &list)
            .await
            .into_iter()
            .map(|i| i.name)
            .collect();
        remaining.sort();
        assert_eq!(remaining, ["b", "d"]);
    }

    #[tokio::test]
    async fn test_remove_completed_with_none_done_is_noop() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");
        gateway.add_item(&list, ItemDraft::new("a", 1, "")).await.unwrap();
        let writes = memory.write_count();

        assert_eq!(gateway.remove_completed_items(&list).await.unwrap(), 0);
        assert_eq!(memory.write_count(), writes);
    }

    #[tokio::test]
    async fn test_remove_completed_failure_deletes_nothing() {
        let (memory, gateway) = setup();
        let list = ListId::new("l1");
        for name in ["a", "b"] {
            let item = gateway.add_item(&list, ItemDraft::new(name, 1, "")).await.unwrap();
            gateway.toggle_done(&list, &item.id, false).await.unwrap();
        }
        memory.fail_commits(true);

        let result = gateway.remove_completed_items(&list).await;
        assert!(matches!(result, Err(SyncError::Transport(_))));
        assert_eq!(stored_items(&memory, &list).await.len(), 2);
        assert!(gateway.notice().current().is_some());
    }
}
