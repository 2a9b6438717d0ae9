//! In-process [`DocumentStore`] with live listeners.
//!
//! Used by the CLI (persisted as a JSON file between runs) and by tests.
//! Listeners are re-evaluated after every committed write and receive a new
//! snapshot only when their result actually changed.
//!
//! Fault switches ([`MemoryStore::fail_reads`], [`MemoryStore::fail_writes`],
//! [`MemoryStore::fail_commits`], [`MemoryStore::break_listeners`]) simulate
//! transport failures.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

use super::{
    CollectionPath, Document, DocumentPath, DocumentStore, DocumentUpdate, Fields,
    ListenerRegistration, Query, SnapshotStream, StoreError, WriteBatch,
};

/// In-memory document store.
///
/// Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    documents: BTreeMap<DocumentPath, Fields>,
    listeners: Vec<Listener>,
    next_listener_id: u64,
    faults: Faults,
    write_count: u64,
}

#[derive(Default, Clone, Copy)]
struct Faults {
    reads: bool,
    writes: bool,
    commits: bool,
}

struct Listener {
    id: u64,
    target: ListenerTarget,
}

enum ListenerTarget {
    Document {
        path: DocumentPath,
        last: Option<Option<Document>>,
        tx: mpsc::UnboundedSender<Result<Option<Document>, StoreError>>,
    },
    Query {
        query: Query,
        last: Option<Vec<Document>>,
        tx: mpsc::UnboundedSender<Result<Vec<Document>, StoreError>>,
    },
}

/// On-disk form of a [`MemoryStore`].
#[derive(Serialize, Deserialize)]
struct Dump {
    documents: BTreeMap<String, Fields>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load documents previously written by [`MemoryStore::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the input is not a valid dump.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let dump: Dump = serde_json::from_str(json).map_err(|e| StoreError::Decode {
            path: DocumentPath::from_raw(String::new()),
            message: e.to_string(),
        })?;

        let store = Self::new();
        store.lock().documents = dump
            .documents
            .into_iter()
            .map(|(path, fields)| (DocumentPath::from_raw(path), fields))
            .collect();
        Ok(store)
    }

    /// Serialize every document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        let dump = Dump {
            documents: self
                .lock()
                .documents
                .iter()
                .map(|(path, fields)| (path.as_str().to_owned(), fields.clone()))
                .collect(),
        };
        serde_json::to_string_pretty(&dump).map_err(|e| StoreError::Encode(e.to_string()))
    }

    /// Make one-shot reads (`get`, `query`) fail.
    pub fn fail_reads(&self, fail: bool) {
        self.lock().faults.reads = fail;
    }

    /// Make single-document writes (`set`, `update`, `create`, `delete`) fail.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().faults.writes = fail;
    }

    /// Make batch commits fail.
    pub fn fail_commits(&self, fail: bool) {
        self.lock().faults.commits = fail;
    }

    /// Terminate every active listener with a transport error.
    pub fn break_listeners(&self, reason: &str) {
        let listeners = std::mem::take(&mut self.lock().listeners);
        debug!(count = listeners.len(), reason, "Breaking listeners");
        for listener in listeners {
            let error = StoreError::Unavailable(reason.to_owned());
            match listener.target {
                ListenerTarget::Document { tx, .. } => {
                    let _ = tx.send(Err(error));
                }
                ListenerTarget::Query { tx, .. } => {
                    let _ = tx.send(Err(error));
                }
            }
        }
    }

    /// Number of document writes applied so far (batch deletes count each).
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.lock().write_count
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.lock().documents.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, target: ListenerTarget) -> ListenerRegistration {
        let mut inner = self.lock();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push(Listener { id, target });
        inner.notify();
        drop(inner);

        let weak = Arc::downgrade(&self.inner);
        ListenerRegistration::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                inner.listeners.retain(|listener| listener.id != id);
                trace!(listener_id = id, "Listener removed");
            }
        })
    }
}

impl Inner {
    fn check_writes(&self) -> Result<(), StoreError> {
        if self.faults.writes {
            return Err(StoreError::Unavailable("writes are failing".to_owned()));
        }
        Ok(())
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.faults.reads {
            return Err(StoreError::Unavailable("reads are failing".to_owned()));
        }
        Ok(())
    }

    fn document(&self, path: &DocumentPath) -> Option<Document> {
        self.documents.get(path).map(|fields| Document {
            path: path.clone(),
            fields: fields.clone(),
        })
    }

    fn run_query(&self, query: &Query) -> Vec<Document> {
        let mut results: Vec<Document> = self
            .documents
            .iter()
            .filter(|(path, fields)| query.matches(path, fields))
            .map(|(path, fields)| Document {
                path: path.clone(),
                fields: fields.clone(),
            })
            .collect();
        query.sort(&mut results);
        results
    }

    /// Push fresh snapshots to listeners whose results changed; drop closed ones.
    fn notify(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        listeners.retain_mut(|listener| match &mut listener.target {
            ListenerTarget::Document { path, last, tx } => {
                let current = self.document(path);
                if last.as_ref() == Some(&current) {
                    return !tx.is_closed();
                }
                *last = Some(current.clone());
                tx.send(Ok(current)).is_ok()
            }
            ListenerTarget::Query { query, last, tx } => {
                let current = self.run_query(query);
                if last.as_ref() == Some(&current) {
                    return !tx.is_closed();
                }
                *last = Some(current.clone());
                tx.send(Ok(current)).is_ok()
            }
        });
        self.listeners = listeners;
    }

    fn record_write(&mut self) {
        self.write_count += 1;
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        let inner = self.lock();
        inner.check_reads()?;
        Ok(inner.document(path))
    }

    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.check_writes()?;
        inner.documents.insert(path.clone(), fields);
        inner.record_write();
        inner.notify();
        Ok(())
    }

    async fn update(&self, path: &DocumentPath, update: DocumentUpdate) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.check_writes()?;
        let fields = inner
            .documents
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        update.apply(fields);
        inner.record_write();
        inner.notify();
        Ok(())
    }

    async fn create(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<DocumentPath, StoreError> {
        let mut inner = self.lock();
        inner.check_writes()?;
        let path = collection.doc(&Uuid::new_v4().simple().to_string());
        inner.documents.insert(path.clone(), fields);
        inner.record_write();
        inner.notify();
        Ok(path)
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.check_writes()?;
        inner.documents.remove(path);
        inner.record_write();
        inner.notify();
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let inner = self.lock();
        inner.check_reads()?;
        Ok(inner.run_query(query))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.faults.commits {
            return Err(StoreError::Unavailable("batch commit failed".to_owned()));
        }
        for path in batch.deletes() {
            inner.documents.remove(path);
            inner.record_write();
        }
        inner.notify();
        Ok(())
    }

    fn listen_document(&self, path: &DocumentPath) -> SnapshotStream<Option<Document>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let registration = self.register(ListenerTarget::Document {
            path: path.clone(),
            last: None,
            tx,
        });
        SnapshotStream::new(rx, registration)
    }

    fn listen_query(&self, query: &Query) -> SnapshotStream<Vec<Document>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let registration = self.register(ListenerTarget::Query {
            query: query.clone(),
            last: None,
            tx,
        });
        SnapshotStream::new(rx, registration)
    }
}
