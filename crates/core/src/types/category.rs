//! Categories, their ids and colors, and the built-in standard set.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Color returned for items without a category or with an unknown one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#D3D3D3";

/// Maximum number of custom (non-standard) categories per user.
pub const MAX_CUSTOM_CATEGORIES: usize = 15;

/// The built-in categories as `(id, name, color)`, in palette order.
pub const STANDARD_CATEGORIES: [(&str, &str, &str); 9] = [
    ("produce", "Produce", "#90EE90"),
    ("dairy", "Dairy", "#ADD8E6"),
    ("meat", "Meat", "#FFB6C1"),
    ("pantry", "Pantry", "#F5DEB3"),
    ("frozen", "Frozen", "#B0E0E6"),
    ("beverages", "Beverages", "#77B5FE"),
    ("bakery", "Bakery", "#FFDAB9"),
    ("household", "Household", "#D8BFD8"),
    ("other", "Other", "#D3D3D3"),
];

/// Returns a fresh copy of the standard category set.
#[must_use]
pub fn standard_categories() -> Vec<Category> {
    STANDARD_CATEGORIES
        .iter()
        .map(|(id, name, color)| Category {
            id: CategoryId((*id).to_owned()),
            name: (*name).to_owned(),
            color: HexColor((*color).to_owned()),
        })
        .collect()
}

/// Whether `id` names one of the standard categories.
#[must_use]
pub fn is_standard_id(id: &str) -> bool {
    STANDARD_CATEGORIES
        .iter()
        .any(|(standard, _, _)| standard.eq_ignore_ascii_case(id))
}

/// Built-in color of a standard category, if `id` is one.
#[must_use]
pub fn standard_color(id: &str) -> Option<HexColor> {
    STANDARD_CATEGORIES
        .iter()
        .find(|(standard, _, _)| standard.eq_ignore_ascii_case(id))
        .map(|(_, _, color)| HexColor((*color).to_owned()))
}

/// Slug-like category identifier.
///
/// Ids are derived from display names: trimmed, lowercased, with every run of
/// whitespace replaced by a single `-`.
///
/// ```
/// use paste_shop_core::CategoryId;
///
/// let id = CategoryId::from_name("  Snack   Food ").unwrap();
/// assert_eq!(id.as_str(), "snack-food");
/// assert!(CategoryId::from_name("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Derive the id for a category display name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCategoryName`] if the name is blank.
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        let slug = name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");

        if slug.is_empty() {
            return Err(ValidationError::EmptyCategoryName);
        }

        Ok(Self(slug))
    }

    /// Wrap a stored id without re-deriving it.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw id, as stored on items.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == raw.to_lowercase()
    }

    /// Whether this is one of the standard category ids.
    #[must_use]
    pub fn is_standard(&self) -> bool {
        is_standard_id(&self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A `#RRGGBB` (or `#RGB`) color code.
///
/// Parsed colors are normalized to upper case. Deserialization is lenient so
/// that colors written by other clients are still readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    /// Parse and normalize a hex color code.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidColor`] unless the input is `#`
    /// followed by exactly 3 or 6 hex digits.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ValidationError::InvalidColor(s.to_owned()))?;

        let valid_len = digits.len() == 3 || digits.len() == 6;
        if !valid_len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidColor(s.to_owned()));
        }

        Ok(Self(format!("#{}", digits.to_ascii_uppercase())))
    }

    /// The default gray used for uncategorized items.
    #[must_use]
    pub fn default_gray() -> Self {
        Self(DEFAULT_CATEGORY_COLOR.to_owned())
    }

    /// Returns the color code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::default_gray()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for HexColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A color-coded item category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// Slug id, unique within a palette.
    pub id: CategoryId,
    /// Display label.
    pub name: String,
    /// Display color.
    pub color: HexColor,
}

impl Category {
    /// Build a new category from a display name, deriving its id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCategoryName`] if the name is blank.
    pub fn from_name(name: &str, color: HexColor) -> Result<Self, ValidationError> {
        Ok(Self {
            id: CategoryId::from_name(name)?,
            name: name.trim().to_owned(),
            color,
        })
    }
}
