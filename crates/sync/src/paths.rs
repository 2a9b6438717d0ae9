//! Where each kind of document lives in the store.

use paste_shop_core::{ItemId, ListId, UserId};

use crate::store::{CollectionPath, DocumentPath};

/// Collection holding every user's shopping lists.
pub const LISTS: &str = "shoppingLists";
/// Subcollection of a list holding its items.
pub const ITEMS: &str = "items";
/// Collection holding one palette document per user.
pub const USER_CATEGORIES: &str = "userCategories";
/// Field of a palette document holding the category array.
pub const CATEGORIES_FIELD: &str = "categories";

#[must_use]
pub fn lists() -> CollectionPath {
    CollectionPath::root(LISTS)
}

#[must_use]
pub fn list(list: &ListId) -> DocumentPath {
    lists().doc(list.as_str())
}

#[must_use]
pub fn items(list_id: &ListId) -> CollectionPath {
    list(list_id).collection(ITEMS)
}

#[must_use]
pub fn item(list_id: &ListId, item: &ItemId) -> DocumentPath {
    items(list_id).doc(item.as_str())
}

#[must_use]
pub fn user_categories(user: &UserId) -> DocumentPath {
    CollectionPath::root(USER_CATEGORIES).doc(user.as_str())
}
