//! Integration tests for the list detail view.

#![allow(clippy::unwrap_used)]

use paste_shop_core::{CategoryId, GroupKey, HexColor, ListId};
use paste_shop_integration_tests::TestContext;
use paste_shop_sync::{ListDetailView, SyncError};

async fn open_view(ctx: &TestContext, list: &ListId) -> ListDetailView {
    let mut items = ctx.client.items().subscribe(&ctx.user, list);
    let mut categories = ctx.client.categories().subscribe(Some(&ctx.user));
    items.wait_for(|s| s.value.items_loaded).await.unwrap();
    categories.loaded().await;
    ListDetailView::new(items, categories)
}

/// Wait on the view until `done` holds.
async fn settle(view: &mut ListDetailView, mut done: impl FnMut(&ListDetailView) -> bool) {
    while !done(view) {
        assert!(view.changed().await, "view closed before settling");
    }
}

#[tokio::test]
async fn test_every_item_lands_in_exactly_one_group() {
    let ctx = TestContext::new();
    let list = ctx.list("Groceries").await;
    let apples = ctx.item(&list, "Apples", "produce").await;
    let milk = ctx.item(&list, "Milk", "DAIRY").await;
    let foil = ctx.item(&list, "Foil", "").await;
    let mystery = ctx.item(&list, "Mystery", "not-a-category").await;

    let mut view = open_view(&ctx, &list).await;
    settle(&mut view, |v| v.grouped().item_count() == 4).await;
    let groups = view.grouped();

    assert_eq!(groups.groups()[0].key, GroupKey::Uncategorized);
    let uncategorized = groups.uncategorized();
    assert_eq!(uncategorized.len(), 2);
    assert!(uncategorized.contains(&foil) && uncategorized.contains(&mystery));
    assert_eq!(
        groups.get(&GroupKey::Category(CategoryId::new("produce"))),
        Some([apples].as_slice())
    );
    assert_eq!(
        groups.get(&GroupKey::Category(CategoryId::new("dairy"))),
        Some([milk].as_slice())
    );
    assert!(groups.get(&GroupKey::Category(CategoryId::new("meat"))).is_none());

    let keys: Vec<_> = groups.keys().map(GroupKey::as_str).collect();
    assert_eq!(keys, ["__uncategorized__", "produce", "dairy"]);
}

#[tokio::test]
async fn test_new_category_regroups_existing_items() {
    let ctx = TestContext::new();
    let list = ctx.list("Party").await;
    let chips = ctx.item(&list, "Chips", "snacks").await;

    let mut view = open_view(&ctx, &list).await;
    settle(&mut view, |v| !v.grouped().is_empty()).await;
    assert_eq!(view.grouped().uncategorized(), [chips.clone()]);
    assert_eq!(view.color_of("snacks"), HexColor::default_gray());

    ctx.client
        .categories()
        .add_category(&ctx.user, "Snacks", "#F0A")
        .await
        .unwrap();

    let snacks = GroupKey::Category(CategoryId::new("snacks"));
    settle(&mut view, |v| v.grouped().get(&snacks).is_some()).await;
    let groups = view.grouped();
    assert_eq!(groups.get(&snacks), Some([chips].as_slice()));
    assert!(groups.uncategorized().is_empty());
    assert_eq!(view.color_of("SNACKS").as_str(), "#F0A");
}

#[tokio::test]
async fn test_done_items_enable_remove_completed() {
    let ctx = TestContext::new();
    let list = ctx.list("Groceries").await;
    let milk = ctx.item(&list, "Milk", "dairy").await;

    let mut view = open_view(&ctx, &list).await;
    settle(&mut view, |v| v.snapshot().items.len() == 1).await;
    assert!(!view.has_completed_items());

    ctx.client
        .mutations()
        .toggle_done(&list, &milk.id, false)
        .await
        .unwrap();
    settle(&mut view, ListDetailView::has_completed_items).await;

    ctx.client
        .mutations()
        .remove_completed_items(&list)
        .await
        .unwrap();
    settle(&mut view, |v| v.snapshot().items.is_empty()).await;
    assert!(!view.has_completed_items());
    assert!(!view.is_loading());
}

#[tokio::test]
async fn test_listener_failure_surfaces_list_error() {
    let ctx = TestContext::new();
    let list = ctx.list("Groceries").await;
    ctx.item(&list, "Milk", "dairy").await;

    let mut view = open_view(&ctx, &list).await;
    ctx.memory.break_listeners("connection lost");
    settle(&mut view, |v| v.error().is_some()).await;

    let error = view.error().unwrap();
    assert!(matches!(error, SyncError::Transport(_)));
    assert!(error.is_retryable());
    assert!(!error.user_message().contains("connection lost"));
}
