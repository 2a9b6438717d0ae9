//! CLI command implementations.
//!
//! Every command runs against a [`Session`]: the store file is loaded into a
//! [`MemoryStore`], the command runs, and the store is written back.

pub mod categories;
pub mod items;
pub mod lists;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use paste_shop_core::{ListId, UserId};
use paste_shop_sync::{ListSnapshot, MemoryStore, SyncClient, SyncConfig};

use crate::error::CliError;

/// A loaded store plus the user commands act as.
pub struct Session {
    path: PathBuf,
    memory: MemoryStore,
    client: SyncClient,
    user: UserId,
}

impl Session {
    /// Load the store file at `path`, starting empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn open(path: &Path, config: SyncConfig, user: UserId) -> Result<Self, CliError> {
        let memory = if path.exists() {
            let json = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.to_owned(),
                source,
            })?;
            MemoryStore::from_json(&json)?
        } else {
            tracing::info!("No store file at {}, starting empty", path.display());
            MemoryStore::new()
        };

        let client = SyncClient::new(config, Arc::new(memory.clone()));
        Ok(Self {
            path: path.to_owned(),
            memory,
            client,
            user,
        })
    }

    /// Write the store back to its file.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be encoded or the file written.
    pub fn save(&self) -> Result<(), CliError> {
        let json = self.memory.to_json()?;
        std::fs::write(&self.path, json).map_err(|source| CliError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(documents = self.memory.document_count(), "Store saved");
        Ok(())
    }

    #[must_use]
    pub const fn client(&self) -> &SyncClient {
        &self.client
    }

    #[must_use]
    pub const fn user(&self) -> &UserId {
        &self.user
    }

    /// Wait for a list's metadata and first item snapshot.
    ///
    /// # Errors
    ///
    /// Returns the list's error (not found, permission denied, transport).
    pub async fn load_list(&self, list: &ListId) -> Result<ListSnapshot, CliError> {
        let mut feed = self.client.items().subscribe(&self.user, list);
        let state = feed
            .wait_for(|s| s.value.metadata_loaded && s.value.items_loaded)
            .await
            .unwrap_or_else(|| feed.state());

        match state.error {
            Some(err) => Err(err.into()),
            None => Ok(state.value),
        }
    }
}
