//! Transient user-facing messages with auto-dismiss timers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    /// Zero keeps the notification until removed
    pub duration: Duration,
}

#[derive(Default)]
struct Inner {
    items: Vec<Notification>,
    timers: HashMap<Uuid, JoinHandle<()>>,
}

impl Inner {
    fn remove(&mut self, id: Uuid) -> bool {
        if let Some(timer) = self.timers.remove(&id) {
            timer.abort();
        }
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }
}

/// Owns every live notification and its dismiss timer.
///
/// Timers run on the tokio runtime; dropping the center aborts all of them.
#[derive(Default)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called inside a tokio runtime when `duration` is non-zero
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind, duration: Duration) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            duration,
        };
        let id = notification.id;

        let mut inner = lock(&self.inner);
        inner.items.push(notification);
        if !duration.is_zero() {
            let timer = tokio::spawn(dismiss_after(Arc::downgrade(&self.inner), id, duration));
            inner.timers.insert(id, timer);
        }
        debug!(%id, ?kind, "Notification shown");
        id
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.show(message, NotificationKind::Success, DEFAULT_DURATION)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.show(message, NotificationKind::Error, DEFAULT_DURATION)
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.show(message, NotificationKind::Info, DEFAULT_DURATION)
    }

    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.show(message, NotificationKind::Warning, DEFAULT_DURATION)
    }

    /// Returns whether the notification was still present
    pub fn remove(&self, id: Uuid) -> bool {
        lock(&self.inner).remove(id)
    }

    pub fn list(&self) -> Vec<Notification> {
        lock(&self.inner).items.clone()
    }

    pub fn pending_timers(&self) -> usize {
        lock(&self.inner).timers.len()
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        let mut inner = lock(&self.inner);
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
    }
}

async fn dismiss_after(inner: Weak<Mutex<Inner>>, id: Uuid, duration: Duration) {
    tokio::time::sleep(duration).await;
    if let Some(inner) = inner.upgrade() {
        let mut inner = lock(&inner);
        // Drop our own handle first so `remove` does not abort this task
        inner.timers.remove(&id);
        inner.remove(id);
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
