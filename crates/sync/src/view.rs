//! The list detail screen: one list's items grouped by the owner's palette.

use paste_shop_core::{HexColor, ItemGroups, Palette, group_items};

use crate::error::SyncError;
use crate::feed::Feed;
use crate::items::ListSnapshot;

/// Joins an item feed and a palette feed.
///
/// Grouping is recomputed from the latest snapshots on every call, so it
/// always reflects whichever feed changed last.
#[derive(Debug)]
pub struct ListDetailView {
    items: Feed<ListSnapshot>,
    categories: Feed<Palette>,
    items_closed: bool,
    categories_closed: bool,
}

impl ListDetailView {
    #[must_use]
    pub const fn new(items: Feed<ListSnapshot>, categories: Feed<Palette>) -> Self {
        Self {
            items,
            categories,
            items_closed: false,
            categories_closed: false,
        }
    }

    /// Latest list snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ListSnapshot {
        self.items.value()
    }

    /// Latest palette.
    #[must_use]
    pub fn palette(&self) -> Palette {
        self.categories.value()
    }

    /// Items grouped by category in palette order.
    #[must_use]
    pub fn grouped(&self) -> ItemGroups {
        let snapshot = self.items.value();
        let palette = self.categories.value();
        group_items(&snapshot.items, palette.categories())
    }

    /// Whether "remove completed" has anything to do.
    #[must_use]
    pub fn has_completed_items(&self) -> bool {
        self.items.value().has_completed_items()
    }

    /// Display color for a raw category id.
    #[must_use]
    pub fn color_of(&self, category: &str) -> HexColor {
        self.categories.value().color_of(category)
    }

    /// Whether the items are still loading.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.items.state().loading
    }

    /// Error to display: the list's error if any, else the palette's.
    #[must_use]
    pub fn error(&self) -> Option<SyncError> {
        self.items
            .state()
            .error
            .or_else(|| self.categories.state().error)
    }

    /// Wait until either feed publishes.
    ///
    /// Returns `false` once both feeds have stopped.
    pub async fn changed(&mut self) -> bool {
        loop {
            tokio::select! {
                open = self.items.changed(), if !self.items_closed => {
                    if open {
                        return true;
                    }
                    self.items_closed = true;
                }
                open = self.categories.changed(), if !self.categories_closed => {
                    if open {
                        return true;
                    }
                    self.categories_closed = true;
                }
                else => return false,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use paste_shop_core::{CategoryId, GroupKey, ItemDraft, ListId, UserId};

    use super::*;
    use crate::categories::CategoryStore;
    use crate::items::ItemStore;
    use crate::lists::ListStore;
    use crate::mutations::MutationGateway;
    use crate::notice::Notice;
    use crate::store::{MemoryStore, SharedStore};

    struct Fixture {
        categories: CategoryStore,
        items: ItemStore,
        gateway: MutationGateway,
        user: UserId,
        list: ListId,
    }

    async fn fixture() -> Fixture {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let user = UserId::new("u1");
        let list = ListStore::new(store.clone())
            .create_list(&user, "Groceries")
            .await
            .unwrap()
            .id;
        let categories = CategoryStore::new(store.clone(), 15);
        categories.initialize(&user).await.unwrap();
        Fixture {
            categories,
            items: ItemStore::new(store.clone()),
            gateway: MutationGateway::new(store, Notice::new(Duration::from_secs(3))),
            user,
            list,
        }
    }

    impl Fixture {
        async fn view(&self) -> ListDetailView {
            let mut items = self.items.subscribe(&self.user, &self.list);
            let mut categories = self.categories.subscribe(Some(&self.user));
            items.wait_for(|s| s.value.items_loaded).await;
            categories.loaded().await;
            ListDetailView::new(items, categories)
        }
    }

    #[tokio::test]
    async fn test_groups_follow_item_changes() {
        let fx = fixture().await;
        let mut view = fx.view().await;
        assert!(view.grouped().is_empty());
        assert!(!view.has_completed_items());

        let milk = fx
            .gateway
            .add_item(&fx.list, ItemDraft::new("Milk", 1, "Dairy"))
            .await
            .unwrap();
        while view.grouped().is_empty() {
            assert!(view.changed().await);
        }

        let dairy = GroupKey::Category(CategoryId::new("dairy"));
        assert_eq!(view.grouped().get(&dairy).unwrap(), [milk.clone()]);
        assert_eq!(view.color_of(&milk.category).as_str(), "#ADD8E6");

        fx.gateway.toggle_done(&fx.list, &milk.id, false).await.unwrap();
        while !view.has_completed_items() {
            assert!(view.changed().await);
        }
    }

    #[tokio::test]
    async fn test_groups_follow_palette_changes() {
        let fx = fixture().await;
        fx.gateway
            .add_item(&fx.list, ItemDraft::new("Chips", 1, "snacks"))
            .await
            .unwrap();
        let mut view = fx.view().await;
        while view.snapshot().items.is_empty() {
            assert!(view.changed().await);
        }
        assert_eq!(view.grouped().uncategorized().len(), 1);

        fx.categories
            .add_category(&fx.user, "Snacks", "#F0A")
            .await
            .unwrap();
        let snacks = GroupKey::Category(CategoryId::new("snacks"));
        while view.grouped().get(&snacks).is_none() {
            assert!(view.changed().await);
        }
        assert!(view.grouped().uncategorized().is_empty());
        assert_eq!(view.color_of("SNACKS").as_str(), "#F0A");
    }

    #[tokio::test]
    async fn test_error_prefers_list_error() {
        let fx = fixture().await;
        let items = fx.items.subscribe(&UserId::new("intruder"), &fx.list);
        let mut view = ListDetailView::new(items, fx.categories.subscribe(None));
        while view.error().is_none() {
            assert!(view.changed().await);
        }
        assert!(matches!(view.error(), Some(SyncError::PermissionDenied(_))));
    }
}
