//! Core types for Paste Shop.
//!
//! This module provides type-safe wrappers for the documents the app syncs.

pub mod category;
pub mod id;
pub mod item;
pub mod list;
pub mod palette;
pub mod validation;

pub use category::{
    Category, CategoryId, DEFAULT_CATEGORY_COLOR, HexColor, MAX_CUSTOM_CATEGORIES,
    STANDARD_CATEGORIES, is_standard_id, standard_categories, standard_color,
};
pub use id::*;
pub use item::{ItemDraft, ItemPatch, ListItem, NewItem};
pub use list::{NewList, ShoppingList};
pub use palette::Palette;
pub use validation::ValidationError;
