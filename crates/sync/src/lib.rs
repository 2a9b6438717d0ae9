//! Paste Shop sync layer.
//!
//! Keeps a client's view of shopping lists, list items, and per-user
//! category palettes consistent with a real-time document store.
//!
//! # Components
//!
//! - [`CategoryStore`] - per-user palettes with a standard fallback set
//! - [`ListStore`] - a user's lists, newest first
//! - [`ItemStore`] - one list's metadata and items, oldest first
//! - [`MutationGateway`] - item writes, including atomic removal of done items
//! - [`ListDetailView`] - items grouped by category, recomputed on change
//!
//! Subscriptions return a [`Feed`], which stops listening when dropped.
//! Writes are never applied locally; feeds observe them as their next
//! snapshot.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use paste_shop_core::{ItemDraft, UserId};
//! use paste_shop_sync::{MemoryStore, SyncClient, SyncConfig};
//!
//! # async fn run() -> paste_shop_sync::Result<()> {
//! let client = SyncClient::new(SyncConfig::default(), Arc::new(MemoryStore::new()));
//! let user = UserId::new("u1");
//!
//! let list = client.lists().create_list(&user, "Weekly shop").await?;
//! client
//!     .mutations()
//!     .add_item(&list.id, ItemDraft::new("Milk", 2, "dairy"))
//!     .await?;
//!
//! let mut feed = client.items().subscribe(&user, &list.id);
//! let state = feed.loaded().await;
//! println!("{} items", state.value.items.len());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod categories;
pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod items;
pub mod lists;
pub mod mutations;
pub mod notice;
pub mod paths;
pub mod store;
pub mod view;

pub use categories::CategoryStore;
pub use client::SyncClient;
pub use config::{ConfigError, SyncConfig};
pub use error::{Result, SyncError};
pub use feed::{Feed, FeedSlot, FeedState};
pub use items::{ItemStore, ListSnapshot};
pub use lists::ListStore;
pub use mutations::MutationGateway;
pub use notice::{Notice, NoticeEntry};
pub use store::{DocumentStore, MemoryStore, SharedStore, StoreError};
pub use view::ListDetailView;
