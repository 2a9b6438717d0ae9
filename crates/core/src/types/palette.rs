//! A user's ordered set of category definitions.

use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryId, HexColor, is_standard_id, standard_categories};

/// An ordered category palette (standard plus custom entries).
///
/// Lookups by id are case-insensitive. Colors for unknown or empty ids fall
/// back to [`HexColor::default_gray`], so [`Palette::color_of`] is total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<Category>);

impl Palette {
    /// Wrap an ordered list of categories.
    #[must_use]
    pub const fn new(categories: Vec<Category>) -> Self {
        Self(categories)
    }

    /// The palette every user starts with.
    #[must_use]
    pub fn standard() -> Self {
        Self(standard_categories())
    }

    /// Categories in palette order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.0
    }

    /// Consume the palette and return its categories.
    #[must_use]
    pub fn into_inner(self) -> Vec<Category> {
        self.0
    }

    /// Number of categories, standard included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the palette has no categories at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Find a category by id, ignoring case.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Category> {
        self.0.iter().find(|category| category.id.matches(id))
    }

    /// Whether a category with this id exists.
    #[must_use]
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.find(id.as_str()).is_some()
    }

    /// Display color for a raw category id as stored on an item.
    ///
    /// ```
    /// use paste_shop_core::Palette;
    ///
    /// let palette = Palette::standard();
    /// assert_eq!(palette.color_of("Dairy").as_str(), "#ADD8E6");
    /// assert_eq!(palette.color_of("").as_str(), "#D3D3D3");
    /// assert_eq!(palette.color_of("no-such-thing").as_str(), "#D3D3D3");
    /// ```
    #[must_use]
    pub fn color_of(&self, id: &str) -> HexColor {
        if id.is_empty() {
            return HexColor::default_gray();
        }
        self.find(id)
            .map_or_else(HexColor::default_gray, |category| category.color.clone())
    }

    /// Number of categories that are not part of the standard set.
    #[must_use]
    pub fn custom_count(&self) -> usize {
        self.0
            .iter()
            .filter(|category| !is_standard_id(category.id.as_str()))
            .count()
    }

    /// Append a category unless one with the same id is already present.
    ///
    /// Returns `true` if the category was added.
    pub fn union(&mut self, category: Category) -> bool {
        if self.contains(&category.id) {
            return false;
        }
        self.0.push(category);
        true
    }

    /// Replace the color of the category with this id.
    ///
    /// Returns `false` if no category matched.
    pub fn recolor(&mut self, id: &CategoryId, color: HexColor) -> bool {
        match self.0.iter_mut().find(|category| category.id.matches(id.as_str())) {
            Some(category) => {
                category.color = color;
                true
            }
            None => false,
        }
    }

    /// Remove every category with this id.
    ///
    /// Returns `false` if nothing was removed.
    pub fn remove(&mut self, id: &CategoryId) -> bool {
        let before = self.0.len();
        self.0.retain(|category| !category.id.matches(id.as_str()));
        self.0.len() != before
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<Vec<Category>> for Palette {
    fn from(categories: Vec<Category>) -> Self {
        Self(categories)
    }
}
