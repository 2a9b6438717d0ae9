//! Input validation errors.

/// Malformed user input, rejected before anything is written.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// List name is empty after trimming.
    #[error("list name cannot be empty")]
    EmptyListName,
    /// Item name is empty after trimming.
    #[error("item name cannot be empty")]
    EmptyItemName,
    /// Quantity is zero or negative.
    #[error("quantity must be a positive number (got {0})")]
    NonPositiveQuantity(i64),
    /// Category name is empty, or slugs to an empty id.
    #[error("category name cannot be empty")]
    EmptyCategoryName,
    /// A category with the derived id already exists.
    #[error("category id \"{0}\" already exists, choose a different name")]
    DuplicateCategory(String),
    /// Color is not a `#rgb` or `#rrggbb` hex code.
    #[error("invalid color \"{0}\", expected a hex code like #A1B2C3")]
    InvalidColor(String),
}
