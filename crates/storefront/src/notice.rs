//! Transient, auto-clearing notices.
//!
//! At most one notice is visible. Posting a new one replaces the old one and
//! cancels the old clear timer, so a stale timer can never wipe the newer
//! text.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default time a notice stays visible.
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Sequence number; later notices have larger ids.
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// Holds the current notice and its clear timer.
pub struct NoticeBoard {
    current: Arc<watch::Sender<Option<Notice>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    next_id: AtomicU64,
    duration: Duration,
}

impl NoticeBoard {
    /// Create a board whose notices clear after `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            timer: Mutex::new(None),
            next_id: AtomicU64::new(1),
            duration,
        }
    }

    /// Show `message`, replacing any current notice.
    ///
    /// Outside a Tokio runtime no timer can run; the notice then stays until
    /// replaced or [`dismiss`](Self::dismiss)ed.
    pub fn post(&self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notice = Notice {
            id,
            kind,
            message: message.into(),
        };
        debug!(id, ?kind, message = %notice.message, "Notice posted");

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = timer.take() {
            pending.abort();
        }

        self.current.send_replace(Some(notice));

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let current = Arc::clone(&self.current);
            let duration = self.duration;
            *timer = Some(handle.spawn(async move {
                tokio::time::sleep(duration).await;
                clear_if_current(&current, id);
            }));
        } else {
            debug!(id, "No runtime, notice will not auto-clear");
        }

        id
    }

    /// Clear the current notice now.
    pub fn dismiss(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = timer.take() {
            pending.abort();
        }
        self.current.send_replace(None);
    }

    /// The visible notice, if any.
    #[must_use]
    pub fn current(&self) -> Option<Notice> {
        self.current.borrow().clone()
    }

    /// How long notices stay visible.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Receive every change of the visible notice.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.current.subscribe()
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_DURATION)
    }
}

impl Drop for NoticeBoard {
    fn drop(&mut self) {
        if let Some(pending) = self
            .timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
    }
}

// Only clear the notice this timer was started for.
fn clear_if_current(current: &watch::Sender<Option<Notice>>, id: u64) {
    current.send_if_modified(|notice| {
        if notice.as_ref().is_some_and(|n| n.id == id) {
            *notice = None;
            true
        } else {
            false
        }
    });
}
