//! CLI error type.

use std::path::PathBuf;

use paste_shop_core::ItemId;
use paste_shop_sync::{ConfigError, StoreError, SyncError};
use thiserror::Error;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A sync operation failed; shown with its user-facing message.
    #[error("{}", .0.user_message())]
    Sync(#[from] SyncError),

    /// The store file could not be decoded or encoded.
    #[error("Store file error: {0}")]
    Store(#[from] StoreError),

    /// The store file could not be read or written.
    #[error("Could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The item is not on the list.
    #[error("No item {0} on this list")]
    ItemNotFound(ItemId),
}
