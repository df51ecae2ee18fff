//! Caller-owned live listeners.
//!
//! A `ListenerHandle` owns the task that drains a [`Subscription`] and
//! commits each snapshot. Dropping the handle (or calling `cancel`) stops
//! further commits and detaches the subscription from the backend.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::backend::{DbPath, Snapshot, Subscription};

#[must_use = "dropping a ListenerHandle cancels the listener"]
pub struct ListenerHandle {
    path: DbPath,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Spawn a task calling `on_snapshot` for every snapshot of `subscription`.
    pub(crate) fn spawn<F>(mut subscription: Subscription, mut on_snapshot: F) -> Self
    where
        F: FnMut(Snapshot) + Send + 'static,
    {
        let path = subscription.path().clone();
        let cancelled = Arc::new(AtomicBool::new(false));
        let task_cancelled = Arc::clone(&cancelled);

        let task = tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                if task_cancelled.load(Ordering::SeqCst) {
                    break;
                }
                on_snapshot(snapshot);
            }
            debug!(path = %subscription.path(), "listener stopped");
        });

        Self {
            path,
            cancelled,
            task,
        }
    }

    pub fn path(&self) -> &DbPath {
        &self.path
    }

    /// `true` once the backend closed the stream or the listener was cancelled.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("path", &self.path)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Listeners owned by one view or session, released together on teardown.
#[derive(Debug, Default)]
pub struct ListenerSet {
    handles: Vec<ListenerHandle>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: ListenerHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancel every listener and return how many were released.
    pub fn release_all(&mut self) -> usize {
        let released = self.handles.len();
        self.handles.clear();
        released
    }
}

impl Extend<ListenerHandle> for ListenerSet {
    fn extend<T: IntoIterator<Item = ListenerHandle>>(&mut self, iter: T) {
        self.handles.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::Value;

    use super::*;

    #[tokio::test]
    async fn listener_forwards_snapshots_until_dropped() {
        let (tx, subscription) = Subscription::channel(DbPath::new("a"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handle = ListenerHandle::spawn(subscription, move |s| sink.lock().push(s));
        tx.send(Some(Value::from(1))).expect("send");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(seen.lock().len(), 1);

        drop(handle);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = tx.send(Some(Value::from(2)));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*seen.lock(), vec![Some(Value::from(1))]);
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn listener_finishes_when_stream_closes() {
        let (tx, subscription) = Subscription::channel(DbPath::new("a"));
        let handle = ListenerHandle::spawn(subscription, |_| {});
        drop(tx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn release_all_cancels_every_listener() {
        let mut set = ListenerSet::new();
        let mut senders = Vec::new();
        for name in ["a", "b"] {
            let (tx, subscription) = Subscription::channel(DbPath::new(name));
            senders.push(tx);
            set.push(ListenerHandle::spawn(subscription, |_| {}));
        }

        assert_eq!(set.release_all(), 2);
        assert!(set.is_empty());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(senders.iter().all(|tx| tx.is_closed()));
    }
}
