//! Items on a shopping list, and the inputs that create or edit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ItemId, ValidationError};

/// One entry on a shopping list.
///
/// `category` is a category id matched case-insensitively against the
/// owner's palette; empty means uncategorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub category: String,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub is_done: bool,
}

/// Raw add-item form input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: i64,
    pub category: String,
}

impl ItemDraft {
    /// Convenience constructor.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: i64, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            category: category.into(),
        }
    }

    /// Validate the draft into the fields of a new, not-done item.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyItemName`] or
    /// [`ValidationError::NonPositiveQuantity`].
    pub fn validate(self, added_at: DateTime<Utc>) -> Result<NewItem, ValidationError> {
        Ok(NewItem {
            name: validate_name(&self.name)?,
            quantity: validate_quantity(self.quantity)?,
            category: self.category.trim().to_owned(),
            added_at,
            is_done: false,
        })
    }
}

/// Fields written when an item is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
    pub category: String,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub added_at: DateTime<Utc>,
    pub is_done: bool,
}

/// A partial edit of an item. Only `Some` fields are written.
///
/// `isDone` and `addedAt` are deliberately not editable here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ItemPatch {
    /// Patch touching all three editable fields.
    #[must_use]
    pub fn full(name: impl Into<String>, quantity: i64, category: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            quantity: Some(quantity),
            category: Some(category.into()),
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.category.is_none()
    }

    /// Validate and normalize (trim) the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyItemName`] or
    /// [`ValidationError::NonPositiveQuantity`] for a supplied field that is
    /// invalid.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self.name.as_deref().map(validate_name).transpose()?,
            quantity: self.quantity.map(validate_quantity).transpose()?,
            category: self.category.map(|c| c.trim().to_owned()),
        })
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyItemName);
    }
    Ok(name.to_owned())
}

const fn validate_quantity(quantity: i64) -> Result<i64, ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity(quantity));
    }
    Ok(quantity)
}
