//! Item commands.
//!
//! # Usage
//!
//! ```bash
//! paste-shop add-item <LIST_ID> Milk -q 2 -c dairy
//! paste-shop toggle <LIST_ID> <ITEM_ID>
//! paste-shop edit <LIST_ID> <ITEM_ID> --quantity 3
//! paste-shop delete-item <LIST_ID> <ITEM_ID>
//! paste-shop clear-done <LIST_ID>
//! ```

use paste_shop_core::{ItemDraft, ItemId, ItemPatch, ListId};

use super::Session;
use crate::error::CliError;

/// Add an item and print its id.
#[allow(clippy::print_stdout)]
pub async fn add(session: &Session, list: &ListId, draft: ItemDraft) -> Result<(), CliError> {
    // Surfaces not-found and permission errors before writing.
    session.load_list(list).await?;
    let item = session.client().mutations().add_item(list, draft).await?;
    println!("{}", item.id);
    Ok(())
}

/// Flip an item's done flag.
pub async fn toggle(session: &Session, list: &ListId, item: &ItemId) -> Result<(), CliError> {
    let snapshot = session.load_list(list).await?;
    let current = snapshot
        .items
        .iter()
        .find(|i| &i.id == item)
        .ok_or_else(|| CliError::ItemNotFound(item.clone()))?;

    session
        .client()
        .mutations()
        .toggle_done(list, item, current.is_done)
        .await?;
    tracing::info!(item = %item, done = !current.is_done, "Item toggled");
    Ok(())
}

/// Edit the supplied fields of an item.
pub async fn edit(
    session: &Session,
    list: &ListId,
    item: &ItemId,
    patch: ItemPatch,
) -> Result<(), CliError> {
    let snapshot = session.load_list(list).await?;
    if !snapshot.items.iter().any(|i| &i.id == item) {
        return Err(CliError::ItemNotFound(item.clone()));
    }

    session.client().mutations().save_item(list, item, patch).await?;
    Ok(())
}

/// Delete an item.
pub async fn delete(session: &Session, list: &ListId, item: &ItemId) -> Result<(), CliError> {
    session.load_list(list).await?;
    session.client().mutations().delete_item(list, item).await?;
    Ok(())
}

/// Remove every done item.
#[allow(clippy::print_stdout)]
pub async fn clear_done(session: &Session, list: &ListId) -> Result<(), CliError> {
    session.load_list(list).await?;
    let removed = session.client().mutations().remove_completed_items(list).await?;
    println!("Removed {removed} completed item(s).");
    Ok(())
}
