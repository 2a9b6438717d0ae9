//! Live feeds: the local view side of a store listener.
//!
//! A [`Feed`] owns a background task that consumes a [`SnapshotStream`],
//! maps each snapshot into a domain value, and publishes a [`FeedState`]
//! through a `tokio::sync::watch` channel. Each published state replaces the
//! previous one wholesale.
//!
//! Dropping or cancelling a feed aborts its task, which drops the underlying
//! listener registration. [`FeedSlot`] keeps at most one feed alive per owner
//! and tears the old one down before subscribing for a new key.
//!
//! [`SnapshotStream`]: crate::store::SnapshotStream

use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::SyncError;

/// Current state of a live feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState<T> {
    /// Latest value, or a safe fallback after an error.
    pub value: T,
    /// Whether the first snapshot is still pending.
    pub loading: bool,
    /// Error to display, if any.
    pub error: Option<SyncError>,
}

impl<T> FeedState<T> {
    /// Waiting for the first snapshot, showing `value` meanwhile.
    pub const fn loading(value: T) -> Self {
        Self {
            value,
            loading: true,
            error: None,
        }
    }

    /// A loaded value with no error.
    pub const fn ready(value: T) -> Self {
        Self {
            value,
            loading: false,
            error: None,
        }
    }

    /// Failed; `fallback` is shown instead of stale data.
    pub const fn failed(fallback: T, error: SyncError) -> Self {
        Self {
            value: fallback,
            loading: false,
            error: Some(error),
        }
    }
}

/// Handle to a live feed.
///
/// The feed stops when the handle is dropped or [`Feed::cancel`] is called.
#[derive(Debug)]
pub struct Feed<T> {
    rx: watch::Receiver<FeedState<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> Feed<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a feed whose producer runs on the current tokio runtime.
    ///
    /// `produce` receives the sender and publishes states until it returns.
    pub(crate) fn spawn<F, Fut>(initial: FeedState<T>, produce: F) -> Self
    where
        F: FnOnce(watch::Sender<FeedState<T>>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = watch::channel(initial);
        let task = tokio::spawn(produce(tx));
        Self {
            rx,
            task: Some(task),
        }
    }

    /// A feed with a fixed state and no producer.
    pub(crate) fn fixed(state: FeedState<T>) -> Self {
        let (_tx, rx) = watch::channel(state);
        Self { rx, task: None }
    }

    /// Clone of the current state.
    #[must_use]
    pub fn state(&self) -> FeedState<T> {
        self.rx.borrow().clone()
    }

    /// Clone of the current value.
    #[must_use]
    pub fn value(&self) -> T {
        self.rx.borrow().value.clone()
    }

    /// Wait for the next published state.
    ///
    /// Returns `false` once the producer has finished and no further states
    /// will arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until the state satisfies `predicate` and return it.
    ///
    /// Returns `None` if the producer finishes first.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&FeedState<T>) -> bool,
    ) -> Option<FeedState<T>> {
        self.rx
            .wait_for(|state| predicate(state))
            .await
            .ok()
            .map(|state| state.clone())
    }

    /// Wait until the first snapshot (or an error) has arrived.
    pub async fn loaded(&mut self) -> FeedState<T> {
        match self.wait_for(|state| !state.loading).await {
            Some(state) => state,
            None => self.state(),
        }
    }

    /// A fresh receiver for the same states.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<FeedState<T>> {
        self.rx.clone()
    }

    /// Stop the producer and release its listener.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Feed cancelled");
        }
    }

    /// Whether the producer is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl<T> Drop for Feed<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Holds the single active feed for one owner, keyed by what it observes.
///
/// [`FeedSlot::switch`] cancels the current feed before creating a feed for a
/// different key, so two listeners for different keys are never live at once.
#[derive(Debug)]
pub struct FeedSlot<K, T> {
    current: Option<(K, Feed<T>)>,
}

impl<K, T> Default for FeedSlot<K, T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<K, T> FeedSlot<K, T>
where
    K: PartialEq,
    T: Clone + Send + Sync + 'static,
{
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Make `key` the observed key, subscribing with `subscribe` if it changed.
    pub fn switch(&mut self, key: K, subscribe: impl FnOnce(&K) -> Feed<T>) -> &mut Feed<T> {
        let entry = match self.current.take() {
            Some((current, feed)) if current == key => (current, feed),
            previous => {
                // Tear down before establishing the replacement.
                if let Some((_, mut old)) = previous {
                    old.cancel();
                }
                let feed = subscribe(&key);
                (key, feed)
            }
        };

        &mut self.current.insert(entry).1
    }

    /// The active feed, if any.
    #[must_use]
    pub fn get(&self) -> Option<&Feed<T>> {
        self.current.as_ref().map(|(_, feed)| feed)
    }

    /// The active key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.current.as_ref().map(|(key, _)| key)
    }

    /// Cancel and remove the active feed.
    pub fn clear(&mut self) {
        if let Some((_, mut feed)) = self.current.take() {
            feed.cancel();
        }
    }
}
