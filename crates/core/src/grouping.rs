//! Partitioning of list items by category.
//!
//! [`group_items`] is a pure function of the current item and palette
//! snapshots. Callers re-run it whenever either snapshot changes instead of
//! patching a previous result.

use core::fmt;

use crate::types::{Category, CategoryId, ListItem};

/// Key of the always-present bucket for empty or unknown categories.
pub const UNCATEGORIZED: &str = "__uncategorized__";

/// Bucket key in an [`ItemGroups`] result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Items whose category is empty or not in the palette.
    Uncategorized,
    /// Items whose category matched this palette entry.
    Category(CategoryId),
}

impl GroupKey {
    /// String form of the key; [`UNCATEGORIZED`] for the fallback bucket.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Uncategorized => UNCATEGORIZED,
            Self::Category(id) => id.as_str(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bucket of grouped items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGroup {
    pub key: GroupKey,
    pub items: Vec<ListItem>,
}

/// Ordered category buckets.
///
/// The uncategorized bucket always comes first and is always present, even
/// when empty. Category buckets follow in palette order and are only present
/// when non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGroups(Vec<ItemGroup>);

impl ItemGroups {
    /// Buckets in order.
    #[must_use]
    pub fn groups(&self) -> &[ItemGroup] {
        &self.0
    }

    /// The uncategorized bucket.
    #[must_use]
    pub fn uncategorized(&self) -> &[ListItem] {
        self.get(&GroupKey::Uncategorized).unwrap_or_default()
    }

    /// Items in the bucket with this key, if the bucket is present.
    #[must_use]
    pub fn get(&self, key: &GroupKey) -> Option<&[ListItem]> {
        self.0
            .iter()
            .find(|group| &group.key == key)
            .map(|group| group.items.as_slice())
    }

    /// Bucket keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.0.iter().map(|group| &group.key)
    }

    /// Total number of items across every bucket.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.0.iter().map(|group| group.items.len()).sum()
    }

    /// Whether no bucket holds any item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}

impl IntoIterator for ItemGroups {
    type Item = ItemGroup;
    type IntoIter = std::vec::IntoIter<ItemGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Partition `items` into buckets keyed by category.
///
/// Each item goes to the bucket whose id equals its lowercased `category`,
/// or to the uncategorized bucket if the category is empty or unknown. Item
/// order within a bucket follows input order.
#[must_use]
pub fn group_items(items: &[ListItem], categories: &[Category]) -> ItemGroups {
    let mut buckets: Vec<ItemGroup> = Vec::with_capacity(categories.len() + 1);
    buckets.push(ItemGroup {
        key: GroupKey::Uncategorized,
        items: Vec::new(),
    });
    for category in categories {
        let key = GroupKey::Category(category.id.clone());
        // A palette with a repeated id still gets one bucket.
        if !buckets.iter().any(|bucket| bucket.key == key) {
            buckets.push(ItemGroup {
                key,
                items: Vec::new(),
            });
        }
    }

    for item in items {
        let lookup = item.category.to_lowercase();
        let slot = if lookup.is_empty() {
            None
        } else {
            buckets.iter().position(|bucket| match &bucket.key {
                GroupKey::Category(id) => id.as_str() == lookup,
                GroupKey::Uncategorized => false,
            })
        };

        // Index 0 is always the uncategorized bucket.
        if let Some(bucket) = buckets.get_mut(slot.unwrap_or(0)) {
            bucket.items.push(item.clone());
        }
    }

    buckets.retain(|bucket| bucket.key == GroupKey::Uncategorized || !bucket.items.is_empty());
    ItemGroups(buckets)
}
