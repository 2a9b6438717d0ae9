//! Transient, auto-clearing error notices.
//!
//! Actions whose failure is shown inline rather than returned to a form
//! (toggling an item, clearing completed items) publish the error here. The
//! notice clears itself after a fixed delay unless a newer one replaced it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::error::SyncError;

/// One published notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeEntry {
    pub error: SyncError,
    seq: u64,
}

impl NoticeEntry {
    /// Text to display.
    #[must_use]
    pub fn message(&self) -> String {
        self.error.user_message()
    }
}

/// A single-slot notice shared by every clone.
#[derive(Debug, Clone)]
pub struct Notice {
    tx: Arc<watch::Sender<Option<NoticeEntry>>>,
    next_seq: Arc<AtomicU64>,
    ttl: Duration,
}

impl Notice {
    /// An empty notice whose entries clear after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            next_seq: Arc::new(AtomicU64::new(1)),
            ttl,
        }
    }

    /// Show `error`, replacing any current notice, and schedule its removal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn flash(&self, error: SyncError) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.tx.send_replace(Some(NoticeEntry { error, seq }));

        let tx = Arc::clone(&self.tx);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            // A newer notice owns the slot now; leave it alone.
            let cleared = tx.send_if_modified(|current| {
                if current.as_ref().is_some_and(|entry| entry.seq == seq) {
                    *current = None;
                    true
                } else {
                    false
                }
            });
            if cleared {
                debug!(seq, "Notice expired");
            }
        });
    }

    /// The notice currently shown, if any.
    #[must_use]
    pub fn current(&self) -> Option<SyncError> {
        self.tx.borrow().as_ref().map(|entry| entry.error.clone())
    }

    /// Receive every change to the notice.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<NoticeEntry>> {
        self.tx.subscribe()
    }

    /// Dismiss the current notice immediately.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Auto-clear delay.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use paste_shop_core::ListId;
    use tokio::time::sleep;

    use super::*;
    use crate::store::StoreError;

    fn transport(reason: &str) -> SyncError {
        SyncError::Transport(StoreError::Unavailable(reason.to_owned()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_clears_after_ttl() {
        let notice = Notice::new(Duration::from_secs(3));
        notice.flash(transport("offline"));
        assert_eq!(notice.current(), Some(transport("offline")));

        sleep(Duration::from_millis(2_900)).await;
        assert!(notice.current().is_some());

        sleep(Duration::from_millis(200)).await;
        assert!(notice.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_notice_survives_older_timer() {
        let notice = Notice::new(Duration::from_secs(3));
        notice.flash(transport("first"));

        sleep(Duration::from_secs(2)).await;
        notice.flash(SyncError::ListNotFound(ListId::new("l1")));

        // The first notice's timer fires here but must not clear the second.
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(
            notice.current(),
            Some(SyncError::ListNotFound(ListId::new("l1")))
        );

        sleep(Duration::from_secs(2)).await;
        assert!(notice.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let notice = Notice::new(Duration::from_secs(1));
        let mut rx = notice.subscribe();

        notice.flash(transport("x"));
        rx.changed().await.ok();
        assert!(rx.borrow_and_update().is_some());

        rx.changed().await.ok();
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn test_clear_dismisses_immediately() {
        let notice = Notice::new(Duration::from_secs(60));
        notice.flash(transport("x"));
        notice.clear();
        assert!(notice.current().is_none());
    }
}
