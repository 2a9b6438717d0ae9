//! List commands.
//!
//! # Usage
//!
//! ```bash
//! # Show your lists, newest first
//! paste-shop lists
//!
//! # Create a list
//! paste-shop create-list "Weekly shop"
//!
//! # Show a list grouped by category
//! paste-shop show <LIST_ID>
//! ```

use paste_shop_core::{GroupKey, ListId};
use paste_shop_sync::ListDetailView;

use super::Session;
use crate::error::CliError;

/// Print the user's lists.
#[allow(clippy::print_stdout)]
pub async fn list_all(session: &Session) -> Result<(), CliError> {
    let mut feed = session.client().lists().subscribe(Some(session.user()));
    let state = feed.loaded().await;
    if let Some(err) = state.error {
        return Err(err.into());
    }

    if state.value.is_empty() {
        println!("No shopping lists yet.");
        return Ok(());
    }
    for list in state.value {
        println!(
            "{}  {}  (created {})",
            list.id,
            list.name,
            list.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Create a list and print its id.
#[allow(clippy::print_stdout)]
pub async fn create(session: &Session, name: &str) -> Result<(), CliError> {
    let list = session.client().lists().create_list(session.user(), name).await?;
    println!("{}", list.id);
    Ok(())
}

/// Print a list's items grouped by category.
#[allow(clippy::print_stdout)]
pub async fn show(session: &Session, list: &ListId) -> Result<(), CliError> {
    let client = session.client();
    let snapshot = session.load_list(list).await?;

    let mut items = client.items().subscribe(session.user(), list);
    let mut categories = client.categories().subscribe(Some(session.user()));
    items.wait_for(|s| s.value.items_loaded).await;
    categories.loaded().await;
    let view = ListDetailView::new(items, categories);

    println!("{}", snapshot.name().unwrap_or("(unnamed list)"));
    let palette = view.palette();
    for group in view.grouped() {
        if group.items.is_empty() {
            continue;
        }
        let (label, color) = match &group.key {
            GroupKey::Uncategorized => ("Uncategorized".to_owned(), view.color_of("")),
            GroupKey::Category(id) => (
                palette
                    .find(id.as_str())
                    .map_or_else(|| id.to_string(), |c| c.name.clone()),
                view.color_of(id.as_str()),
            ),
        };

        println!();
        println!("{label} [{color}]");
        for item in &group.items {
            let mark = if item.is_done { "x" } else { " " };
            println!("  [{mark}] {} x{}  ({})", item.name, item.quantity, item.id);
        }
    }

    if view.has_completed_items() {
        println!();
        println!("Completed items can be removed with `clear-done {list}`.");
    }
    Ok(())
}
