//! Shopping lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListId, UserId, ValidationError};

/// A named shopping list owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: ListId,
    pub name: String,
    pub owner_id: UserId,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
}

/// Fields written when a list is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewList {
    pub name: String,
    pub owner_id: UserId,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
}

impl NewList {
    /// Validate a list name for `owner`, stamping it with `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyListName`] if the name is blank.
    pub fn new(
        owner: UserId,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyListName);
        }

        Ok(Self {
            name: name.to_owned(),
            owner_id: owner,
            created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_list_trims_name() {
        let list = NewList::new(UserId::new("u1"), "  Weekly  ", Utc::now()).unwrap();
        assert_eq!(list.name, "Weekly");
    }

    #[test]
    fn test_new_list_rejects_blank_name() {
        assert_eq!(
            NewList::new(UserId::new("u1"), " \n", Utc::now()),
            Err(ValidationError::EmptyListName)
        );
    }

    #[test]
    fn test_field_names_are_camel_case() {
        let created_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let list = NewList::new(UserId::new("u1"), "Weekly", created_at).unwrap();
        let json = serde_json::to_value(list).unwrap();
        assert_eq!(json["ownerId"], "u1");
        assert_eq!(json["createdAt"], 1_700_000_000_000_000_i64);
    }
}
