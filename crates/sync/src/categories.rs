//! Per-user category palettes.
//!
//! Each user has one palette document at `userCategories/{userId}` holding a
//! `categories` array. The document is created lazily with the standard set
//! and is never deleted.
//!
//! Edits read the stored palette first. Policy errors are judged against it
//! and raised before anything is written; recolor and delete write back the
//! stored array with the one entry changed.

use paste_shop_core::{
    Category, CategoryId, HexColor, Palette, UserId, ValidationError, standard_color,
};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::feed::{Feed, FeedState};
use crate::paths::{self, CATEGORIES_FIELD};
use crate::store::{Document, DocumentPath, DocumentUpdate, Fields, SharedStore, StoreError};

/// Reads, watches, and edits user category palettes.
#[derive(Clone)]
pub struct CategoryStore {
    store: SharedStore,
    max_custom: usize,
}

impl CategoryStore {
    /// Create a category store allowing `max_custom` custom categories per user.
    #[must_use]
    pub fn new(store: SharedStore, max_custom: usize) -> Self {
        Self { store, max_custom }
    }

    /// Custom category limit.
    #[must_use]
    pub const fn max_custom(&self) -> usize {
        self.max_custom
    }

    /// Ensure the user's palette document exists and return its contents.
    ///
    /// A missing document is created with the standard set. Concurrent calls
    /// write identical contents, so racing initializations converge.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] if the store cannot be read or written.
    #[instrument(skip(self))]
    pub async fn initialize(&self, user: &UserId) -> Result<Palette> {
        let path = paths::user_categories(user);
        match self.store.get(&path).await? {
            Some(doc) => match decode_palette(&doc) {
                Ok(palette) => Ok(palette),
                Err(e) => {
                    warn!(error = %e, "Malformed category palette, resetting to standard");
                    write_standard(&self.store, &path).await?;
                    Ok(Palette::standard())
                }
            },
            None => {
                info!("Creating category palette with standard categories");
                write_standard(&self.store, &path).await?;
                Ok(Palette::standard())
            }
        }
    }

    /// Watch a user's palette.
    ///
    /// With no user the feed serves the standard set and stays loading. A
    /// missing document is created; a malformed one is served as the standard
    /// set and rewritten. A listener failure ends the feed with the standard
    /// set as fallback.
    #[must_use]
    pub fn subscribe(&self, user: Option<&UserId>) -> Feed<Palette> {
        let Some(user) = user else {
            return Feed::fixed(FeedState::loading(Palette::standard()));
        };

        let store = self.store.clone();
        let path = paths::user_categories(user);
        let user = user.clone();
        Feed::spawn(FeedState::loading(Palette::standard()), move |tx| async move {
            let mut stream = store.listen_document(&path);
            while let Some(snapshot) = stream.next().await {
                let state = match snapshot {
                    Ok(Some(doc)) => match decode_palette(&doc) {
                        Ok(palette) => FeedState::ready(palette),
                        Err(e) => {
                            warn!(
                                %user,
                                error = %e,
                                "Malformed category palette, resetting to standard"
                            );
                            if let Err(e) = write_standard(&store, &path).await {
                                error!(%user, error = %e, "Failed to repair category palette");
                            }
                            FeedState::ready(Palette::standard())
                        }
                    },
                    Ok(None) => {
                        info!(%user, "Creating category palette with standard categories");
                        match write_standard(&store, &path).await {
                            Ok(()) => FeedState::ready(Palette::standard()),
                            Err(e) => {
                                error!(%user, error = %e, "Failed to initialize category palette");
                                FeedState::failed(Palette::standard(), e.into())
                            }
                        }
                    }
                    Err(e) => {
                        error!(%user, error = %e, "Category listener failed");
                        tx.send_replace(FeedState::failed(Palette::standard(), e.into()));
                        break;
                    }
                };
                tx.send_replace(state);
            }
        })
    }

    /// Add a custom category.
    ///
    /// The stored palette is read first; name, duplicate, and limit checks
    /// run against it before anything is written. A missing or malformed
    /// palette counts as the standard set and is rewritten along with the new
    /// entry.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Validation`] for a blank name, a duplicate id, or an
    ///   invalid color
    /// - [`SyncError::CategoryLimitExceeded`] when the custom limit is reached
    /// - [`SyncError::Transport`] if the read or write fails
    #[instrument(skip(self))]
    pub async fn add_category(&self, user: &UserId, name: &str, color: &str) -> Result<Category> {
        let id = CategoryId::from_name(name)?;
        let path = paths::user_categories(user);
        let stored = self.read_palette(&path).await?;
        let exists = stored.is_some();

        let current = stored.unwrap_or_default();
        if current.contains(&id) {
            return Err(ValidationError::DuplicateCategory(id.to_string()).into());
        }
        if current.custom_count() >= self.max_custom {
            return Err(SyncError::CategoryLimitExceeded {
                limit: self.max_custom,
            });
        }
        let category = Category {
            id,
            name: name.trim().to_owned(),
            color: HexColor::parse(color)?,
        };

        let written = if exists {
            let value = encode(&category)?;
            let update = DocumentUpdate::new().array_union(CATEGORIES_FIELD, vec![value]);
            self.store.update(&path, update).await
        } else {
            let mut palette = current;
            palette.union(category.clone());
            write_palette(&self.store, &path, &palette).await
        };
        written.inspect_err(|e| error!(error = %e, "Failed to add category"))?;

        info!(category = %category.id, "Category added");
        Ok(category)
    }

    /// Change the color of an existing category, standard or custom.
    ///
    /// Returns the palette as written.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Validation`] for an invalid color
    /// - [`SyncError::CategoryNotFound`] if the stored palette has no such category
    /// - [`SyncError::Transport`] if the read or write fails
    #[instrument(skip(self))]
    pub async fn update_category_color(
        &self,
        user: &UserId,
        id: &CategoryId,
        color: &str,
    ) -> Result<Palette> {
        let color = HexColor::parse(color)?;
        self.recolor(user, id, color).await
    }

    /// Restore a category's built-in color.
    ///
    /// Standard categories return to their standard color; custom ones to
    /// the default gray.
    ///
    /// # Errors
    ///
    /// Same as [`CategoryStore::update_category_color`].
    #[instrument(skip(self))]
    pub async fn reset_category_color(&self, user: &UserId, id: &CategoryId) -> Result<Palette> {
        let color = standard_color(id.as_str()).unwrap_or_default();
        self.recolor(user, id, color).await
    }

    /// Delete a custom category.
    ///
    /// Every entry with this id is removed from the stored palette, so a
    /// concurrent recolor of the same category does not make the delete miss.
    ///
    /// # Errors
    ///
    /// - [`SyncError::CannotDeleteStandard`] for a standard category
    /// - [`SyncError::CategoryNotFound`] if the palette has no such category
    /// - [`SyncError::Transport`] if the read or write fails
    #[instrument(skip(self))]
    pub async fn delete_category(&self, user: &UserId, id: &CategoryId) -> Result<()> {
        if id.is_standard() {
            return Err(SyncError::CannotDeleteStandard(id.clone()));
        }

        let path = paths::user_categories(user);
        let Some(mut palette) = self.read_palette(&path).await? else {
            return Err(SyncError::CategoryNotFound(id.clone()));
        };
        if !palette.remove(id) {
            return Err(SyncError::CategoryNotFound(id.clone()));
        }

        let update = DocumentUpdate::new().set(CATEGORIES_FIELD, encode(palette.categories())?);
        self.store.update(&path, update).await.inspect_err(|e| {
            error!(error = %e, "Failed to delete category");
        })?;

        info!(category = %id, "Category deleted");
        Ok(())
    }

    async fn recolor(&self, user: &UserId, id: &CategoryId, color: HexColor) -> Result<Palette> {
        let path = paths::user_categories(user);
        let mut palette = self.read_palette(&path).await?.unwrap_or_default();
        if !palette.recolor(id, color) {
            return Err(SyncError::CategoryNotFound(id.clone()));
        }

        write_palette(&self.store, &path, &palette)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to update category color"))?;

        info!(category = %id, "Category color updated");
        Ok(palette)
    }

    /// The stored palette, or `None` if it is missing or malformed.
    async fn read_palette(&self, path: &DocumentPath) -> Result<Option<Palette>> {
        let doc = self.store.get(path).await.inspect_err(|e| {
            error!(error = %e, "Failed to read category palette");
        })?;
        Ok(doc.and_then(|doc| {
            decode_palette(&doc)
                .inspect_err(|e| warn!(error = %e, "Malformed category palette"))
                .ok()
        }))
    }
}

impl std::fmt::Debug for CategoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryStore")
            .field("max_custom", &self.max_custom)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Decode the `categories` array of a palette document.
fn decode_palette(doc: &Document) -> std::result::Result<Palette, StoreError> {
    let categories = doc
        .fields
        .get(CATEGORIES_FIELD)
        .cloned()
        .unwrap_or(Value::Null);
    serde_json::from_value::<Vec<Category>>(categories)
        .map(Palette::new)
        .map_err(|e| StoreError::Decode {
            path: doc.path.clone(),
            message: e.to_string(),
        })
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> std::result::Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Encode(e.to_string()))
}

async fn write_palette(
    store: &SharedStore,
    path: &DocumentPath,
    palette: &Palette,
) -> std::result::Result<(), StoreError> {
    let mut fields = Fields::new();
    fields.insert(CATEGORIES_FIELD.to_owned(), encode(palette.categories())?);
    store.set(path, fields).await
}

async fn write_standard(
    store: &SharedStore,
    path: &DocumentPath,
) -> std::result::Result<(), StoreError> {
    write_palette(store, path, &Palette::standard()).await
}
