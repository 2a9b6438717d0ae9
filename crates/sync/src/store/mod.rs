//! Document store abstraction.
//!
//! The sync layer talks to a real-time document database through the
//! [`DocumentStore`] trait: one-shot reads and writes, atomic delete batches,
//! value-based array transforms, and live listeners that push full snapshots.
//!
//! # Data layout
//!
//! Documents are addressed by slash-separated paths alternating collection and
//! document segments, e.g. `shoppingLists/{listId}/items/{itemId}`. Each
//! document is a JSON object of fields.
//!
//! # Listeners
//!
//! [`DocumentStore::listen_document`] and [`DocumentStore::listen_query`]
//! return a [`SnapshotStream`]. Every message is the complete current result;
//! consumers replace their local view with it. A listener that reports an
//! error is finished. Dropping the stream unregisters the listener.

mod memory;

pub use memory::MemoryStore;

use core::cmp::Ordering;
use core::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// A document's fields.
pub type Fields = serde_json::Map<String, Value>;

/// Shared handle to a document store.
pub type SharedStore = Arc<dyn DocumentStore>;

/// Errors reported by a document store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Network or backend failure; the operation may be retried.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The document to update does not exist.
    #[error("document not found: {0}")]
    NotFound(DocumentPath),

    /// A document could not be decoded into the expected shape.
    #[error("malformed document {path}: {message}")]
    Decode {
        /// Path of the offending document.
        path: DocumentPath,
        /// Decoder message.
        message: String,
    },

    /// Fields could not be encoded for writing.
    #[error("could not encode fields: {0}")]
    Encode(String),
}

impl StoreError {
    /// Whether retrying the same operation later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Path of a collection (odd number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// A top-level collection.
    #[must_use]
    pub fn root(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// The document with `id` inside this collection.
    #[must_use]
    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath(format!("{}/{id}", self.0))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path of a document (even number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// The subcollection `name` under this document.
    #[must_use]
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{name}", self.0))
    }

    /// The last path segment.
    #[must_use]
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// The collection containing this document.
    #[must_use]
    pub fn parent(&self) -> CollectionPath {
        let parent = self.0.rsplit_once('/').map_or("", |(parent, _)| parent);
        CollectionPath(parent.to_owned())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_raw(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocumentPath,
    pub fields: Fields,
}

impl Document {
    /// The document's id (last path segment).
    #[must_use]
    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Decode the fields, plus an `id` field holding the document id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_owned(), Value::String(self.id().to_owned()));
        serde_json::from_value(Value::Object(fields)).map_err(|e| StoreError::Decode {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

/// Encode a serializable value as a document's fields.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] unless `value` serializes to a JSON object.
pub fn to_fields<T: serde::Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(StoreError::Encode(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(StoreError::Encode(e.to_string())),
    }
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// An equality filter on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

/// A live or one-shot query over the documents of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: CollectionPath,
    pub filters: Vec<Filter>,
    pub order: Option<(String, Direction)>,
}

impl Query {
    /// All documents of `collection`, unordered.
    #[must_use]
    pub const fn new(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order: None,
        }
    }

    /// Keep only documents whose `field` equals `value`.
    #[must_use]
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_owned(),
            value: value.into(),
        });
        self
    }

    /// Order results by `field`. Documents lacking the field are excluded.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order = Some((field.to_owned(), direction));
        self
    }

    /// Whether a document at `path` with `fields` belongs to the result set.
    #[must_use]
    pub fn matches(&self, path: &DocumentPath, fields: &Fields) -> bool {
        if path.parent() != self.collection {
            return false;
        }
        if let Some((field, _)) = &self.order
            && !fields.contains_key(field)
        {
            return false;
        }
        self.filters
            .iter()
            .all(|filter| fields.get(&filter.field) == Some(&filter.value))
    }

    /// Sort matching documents. Ties are broken by document path.
    pub fn sort(&self, documents: &mut [Document]) {
        documents.sort_by(|a, b| {
            let by_field = self.order.as_ref().map_or(Ordering::Equal, |(field, direction)| {
                let ordering = compare_values(a.fields.get(field), b.fields.get(field));
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
            by_field.then_with(|| a.path.cmp(&b.path))
        });
    }
}

/// Total order over optional JSON values: missing < null < bool < number < string < other.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(Value::Array(_) | Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or_default()
                .total_cmp(&y.as_f64().unwrap_or_default()),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// A change to one field in [`DocumentStore::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Overwrite the field.
    Set(Value),
    /// Append each element not already present (by equality).
    ArrayUnion(Vec<Value>),
    /// Remove every element equal to one of these.
    ArrayRemove(Vec<Value>),
}

/// A partial update of an existing document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUpdate(Vec<(String, FieldValue)>);

impl DocumentUpdate {
    /// An update that changes nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Overwrite `field` with `value`.
    #[must_use]
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.push((field.to_owned(), FieldValue::Set(value.into())));
        self
    }

    /// Union `values` into the array at `field`.
    #[must_use]
    pub fn array_union(mut self, field: &str, values: Vec<Value>) -> Self {
        self.0.push((field.to_owned(), FieldValue::ArrayUnion(values)));
        self
    }

    /// Remove `values` from the array at `field`.
    #[must_use]
    pub fn array_remove(mut self, field: &str, values: Vec<Value>) -> Self {
        self.0.push((field.to_owned(), FieldValue::ArrayRemove(values)));
        self
    }

    /// Whether the update has no field changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply the changes to `fields` in order.
    pub fn apply(self, fields: &mut Fields) {
        for (name, change) in self.0 {
            match change {
                FieldValue::Set(value) => {
                    fields.insert(name, value);
                }
                FieldValue::ArrayUnion(values) => {
                    let mut array = take_array(fields, &name);
                    for value in values {
                        if !array.contains(&value) {
                            array.push(value);
                        }
                    }
                    fields.insert(name, Value::Array(array));
                }
                FieldValue::ArrayRemove(values) => {
                    let mut array = take_array(fields, &name);
                    array.retain(|existing| !values.contains(existing));
                    fields.insert(name, Value::Array(array));
                }
            }
        }
    }
}

impl From<Fields> for DocumentUpdate {
    fn from(fields: Fields) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(name, value)| (name, FieldValue::Set(value)))
                .collect(),
        )
    }
}

/// Array transforms replace non-array values with an empty array first.
fn take_array(fields: &mut Fields, name: &str) -> Vec<Value> {
    match fields.remove(name) {
        Some(Value::Array(array)) => array,
        _ => Vec::new(),
    }
}

/// A set of deletes committed all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    deletes: Vec<DocumentPath>,
}

impl WriteBatch {
    /// An empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deletes: Vec::new(),
        }
    }

    /// Queue a delete.
    pub fn delete(&mut self, path: DocumentPath) -> &mut Self {
        self.deletes.push(path);
        self
    }

    /// Queued deletes.
    #[must_use]
    pub fn deletes(&self) -> &[DocumentPath] {
        &self.deletes
    }

    /// Number of queued operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deletes.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty()
    }
}

/// Unregisters a listener when dropped.
pub struct ListenerRegistration {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerRegistration {
    /// Run `cancel` when the registration is dropped.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Full snapshots pushed by a live listener.
#[derive(Debug)]
pub struct SnapshotStream<T> {
    rx: mpsc::UnboundedReceiver<Result<T, StoreError>>,
    _registration: ListenerRegistration,
}

impl<T> SnapshotStream<T> {
    /// Pair a snapshot channel with the registration that owns it.
    #[must_use]
    pub const fn new(
        rx: mpsc::UnboundedReceiver<Result<T, StoreError>>,
        registration: ListenerRegistration,
    ) -> Self {
        Self {
            rx,
            _registration: registration,
        }
    }

    /// The next snapshot, or `None` once the listener has been torn down.
    pub async fn next(&mut self) -> Option<Result<T, StoreError>> {
        self.rx.recv().await
    }
}

/// A real-time document database.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Read one document.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite a document.
    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError>;

    /// Change fields of an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, path: &DocumentPath, update: DocumentUpdate) -> Result<(), StoreError>;

    /// Add a document with a store-generated id.
    async fn create(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<DocumentPath, StoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError>;

    /// Run a query once.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Commit every operation in `batch`, or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Listen to one document.
    fn listen_document(&self, path: &DocumentPath) -> SnapshotStream<Option<Document>>;

    /// Listen to a query.
    fn listen_query(&self, query: &Query) -> SnapshotStream<Vec<Document>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        }
    }

    #[test]
    fn test_paths() {
        let list = CollectionPath::root("shoppingLists").doc("l1");
        let item = list.collection("items").doc("i1");
        assert_eq!(item.as_str(), "shoppingLists/l1/items/i1");
        assert_eq!(item.id(), "i1");
        assert_eq!(item.parent().as_str(), "shoppingLists/l1/items");
        assert_eq!(list.parent(), CollectionPath::root("shoppingLists"));
    }

    #[test]
    fn test_query_matches_direct_children_only() {
        let lists = CollectionPath::root("shoppingLists");
        let query = Query::new(lists.clone()).where_eq("ownerId", "u1");

        let owned = fields(json!({"ownerId": "u1"}));
        assert!(query.matches(&lists.doc("a"), &owned));
        assert!(!query.matches(&lists.doc("a").collection("items").doc("b"), &owned));
        assert!(!query.matches(&lists.doc("a"), &fields(json!({"ownerId": "u2"}))));
    }

    #[test]
    fn test_query_order_excludes_missing_field() {
        let items = CollectionPath::root("items");
        let query = Query::new(items.clone()).order_by("addedAt", Direction::Ascending);
        assert!(!query.matches(&items.doc("a"), &fields(json!({"name": "x"}))));
    }

    #[test]
    fn test_query_sort_descending_with_tiebreak() {
        let coll = CollectionPath::root("c");
        let query = Query::new(coll.clone()).order_by("createdAt", Direction::Descending);
        let mut docs = vec![
            Document {
                path: coll.doc("a"),
                fields: fields(json!({"createdAt": 1})),
            },
            Document {
                path: coll.doc("c"),
                fields: fields(json!({"createdAt": 5})),
            },
            Document {
                path: coll.doc("b"),
                fields: fields(json!({"createdAt": 5})),
            },
        ];
        query.sort(&mut docs);
        let ids: Vec<_> = docs.iter().map(Document::id).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn test_update_array_transforms() {
        let mut doc = fields(json!({"categories": [1, 2], "other": "x"}));
        DocumentUpdate::new()
            .array_union("categories", vec![json!(2), json!(3)])
            .array_remove("categories", vec![json!(1)])
            .set("other", "y")
            .apply(&mut doc);
        assert_eq!(Value::Object(doc), json!({"categories": [2, 3], "other": "y"}));
    }

    #[test]
    fn test_array_union_on_non_array_replaces() {
        let mut doc = fields(json!({"categories": "garbage"}));
        DocumentUpdate::new()
            .array_union("categories", vec![json!("a")])
            .apply(&mut doc);
        assert_eq!(doc["categories"], json!(["a"]));
    }

    #[test]
    fn test_decode_injects_id() {
        #[derive(serde::Deserialize)]
        struct Named {
            id: String,
            name: String,
        }

        let doc = Document {
            path: CollectionPath::root("c").doc("d1"),
            fields: fields(json!({"name": "n"})),
        };
        let named: Named = doc.decode().unwrap();
        assert_eq!(named.id, "d1");
        assert_eq!(named.name, "n");
    }

    #[test]
    fn test_decode_reports_path() {
        let doc = Document {
            path: CollectionPath::root("c").doc("d1"),
            fields: fields(json!({"quantity": "lots"})),
        };
        let err = doc.decode::<paste_shop_core::ListItem>().unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref path, .. } if path.as_str() == "c/d1"));
    }

    #[test]
    fn test_to_fields_requires_object() {
        assert!(to_fields(&json!({"a": 1})).is_ok());
        assert!(matches!(to_fields(&json!(3)), Err(StoreError::Encode(_))));
    }
}
