//! Synchronous publish/subscribe primitive.
//!
//! `Publisher` keeps an ordered set of observers and calls
//! [`Observer::update`] on each of them, in subscription order, whenever
//! [`Publisher::notify`] is invoked. Membership is by reference identity: the
//! same `Arc` subscribed twice is stored once.
//!
//! `notify` snapshots the subscriber list before iterating, so an observer may
//! subscribe or unsubscribe (itself or others) from inside `update`. Such
//! changes apply from the next `notify`.

use std::sync::Arc;

use parking_lot::Mutex;

/// An entity that receives notifications from a [`Publisher`].
pub trait Observer<P>: Send + Sync {
    fn update(&self, payload: Option<&P>);
}

/// Shared observer reference as stored by a [`Publisher`].
pub type ObserverRef<P> = Arc<dyn Observer<P>>;

pub struct Publisher<P> {
    subscribers: Mutex<Vec<ObserverRef<P>>>,
}

impl<P> Publisher<P> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Add `observer` unless it is already subscribed.
    pub fn subscribe(&self, observer: ObserverRef<P>) {
        let mut subscribers = self.subscribers.lock();
        if subscribers.iter().any(|s| same_observer(s, &observer)) {
            return;
        }
        subscribers.push(observer);
    }

    /// Remove `observer` if present.
    pub fn unsubscribe(&self, observer: &ObserverRef<P>) {
        let mut subscribers = self.subscribers.lock();
        if let Some(idx) = subscribers.iter().position(|s| same_observer(s, observer)) {
            subscribers.remove(idx);
        }
    }

    /// Call `update(payload)` on every current subscriber, in order.
    pub fn notify(&self, payload: Option<&P>) {
        let snapshot: Vec<ObserverRef<P>> = self.subscribers.lock().clone();
        for subscriber in &snapshot {
            subscriber.update(payload);
        }
    }

    pub fn contains(&self, observer: &ObserverRef<P>) -> bool {
        self.subscribers
            .lock()
            .iter()
            .any(|s| same_observer(s, observer))
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }
}

impl<P> Default for Publisher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for Publisher<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("subscribers", &self.len())
            .finish()
    }
}

// Compare data pointers only; vtable pointers for the same type may differ
// across codegen units.
fn same_observer<P>(a: &ObserverRef<P>, b: &ObserverRef<P>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
