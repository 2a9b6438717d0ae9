//! Error taxonomy for sync operations.
//!
//! Validation and policy errors are raised before anything reaches the store.
//! Store failures surface as [`SyncError::Transport`]; callers show
//! [`SyncError::user_message`] rather than the underlying detail.

use paste_shop_core::{CategoryId, ListId, ValidationError};
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by the sync layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// Malformed user input.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The requesting user does not own the list.
    #[error("permission denied for list {0}")]
    PermissionDenied(ListId),

    /// The list document does not exist.
    #[error("list not found: {0}")]
    ListNotFound(ListId),

    /// No category with this id in the palette.
    #[error("category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// The user already has the maximum number of custom categories.
    #[error("custom category limit of {limit} reached")]
    CategoryLimitExceeded {
        /// Configured limit.
        limit: usize,
    },

    /// Standard categories can be recolored but not deleted.
    #[error("standard category {0} cannot be deleted")]
    CannotDeleteStandard(CategoryId),

    /// Store-level failure on a read, write, or listener.
    #[error("transport failure: {0}")]
    Transport(#[from] StoreError),
}

impl SyncError {
    /// Whether the user can reasonably retry the same action.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Message suitable for display. Transport details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => capitalize(&err.to_string()),
            Self::PermissionDenied(_) => "You don't have permission to view this list.".to_string(),
            Self::ListNotFound(_) => "Shopping list not found.".to_string(),
            Self::CategoryNotFound(_) => "Could not find the category to update.".to_string(),
            Self::CategoryLimitExceeded { limit } => {
                format!("You have reached the limit of {limit} custom categories.")
            }
            Self::CannotDeleteStandard(_) => "Standard categories cannot be deleted.".to_string(),
            Self::Transport(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect::<String>() + "."
    })
}

/// Result type alias for `SyncError`.
pub type Result<T> = std::result::Result<T, SyncError>;
