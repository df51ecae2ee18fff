//! Backend collaborator contracts.
//!
//! The store talks to the hosted backend only through these traits:
//!
//! | Trait | Capabilities |
//! |-------|--------------|
//! | [`IdentityProvider`] | create user, sign in, sign out, fresh id token |
//! | [`RealtimeStore`] | read, write, append, live subscribe |
//! | [`PlanApi`] | subscription plan lookup on the internal HTTP API |
//!
//! [`MemoryBackend`] implements all three in-process.

pub mod memory;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpPlanApi;
pub use memory::MemoryBackend;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;

/// Point-in-time value read from the realtime store. `None` means no data.
pub type Snapshot = Option<Value>;

/// Signed-in user reference returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
}

/// Location in the realtime store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DbPath(String);

impl DbPath {
    pub const PUBLIC_PICTURES: &'static str = "PublicPictures";

    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// `{uid}/profile`
    pub fn profile(uid: &str) -> Self {
        Self(format!("{uid}/profile"))
    }

    /// `{uid}/pictures`
    pub fn pictures(uid: &str) -> Self {
        Self(format!("{uid}/pictures"))
    }

    /// Shared collection readable and writable by every user.
    pub fn public_pictures() -> Self {
        Self(Self::PUBLIC_PICTURES.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Live stream of snapshots for one path.
///
/// Backends deliver the current value first, then every later change, in
/// delivery order. Dropping the subscription (or calling [`cancel`]) detaches
/// it; the backend stops sending on its next change.
///
/// [`cancel`]: Subscription::cancel
#[derive(Debug)]
pub struct Subscription {
    path: DbPath,
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    /// Matched sender/subscription pair for backend implementations.
    pub fn channel(path: DbPath) -> (mpsc::UnboundedSender<Snapshot>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { path, rx })
    }

    pub fn path(&self) -> &DbPath {
        &self.path
    }

    /// Next snapshot, or `None` once the backend closed the stream.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    pub fn cancel(mut self) {
        self.rx.close();
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account and sign it in.
    async fn create_user(&self, email: &str, password: &str) -> Result<User>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User>;

    async fn sign_out(&self) -> Result<()>;

    /// Fresh identity token for `user`, suitable for a bearer header.
    async fn id_token(&self, user: &User) -> Result<String>;
}

#[async_trait]
pub trait RealtimeStore: Send + Sync {
    async fn read(&self, path: &DbPath) -> Result<Snapshot>;

    /// Replace the value at `path`. Writing `Value::Null` deletes it.
    async fn write(&self, path: &DbPath, value: Value) -> Result<()>;

    /// Add `value` under a new generated child key of `path` and return the key.
    async fn append(&self, path: &DbPath, value: Value) -> Result<String>;

    async fn subscribe(&self, path: &DbPath) -> Result<Subscription>;
}

#[async_trait]
pub trait PlanApi: Send + Sync {
    /// Subscription plan payload for `user_id`, returned verbatim.
    async fn user_subscription_plan(&self, user_id: &str) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_user_scoped_layout() {
        assert_eq!(DbPath::profile("u1").as_str(), "u1/profile");
        assert_eq!(DbPath::pictures("u1").as_str(), "u1/pictures");
        assert_eq!(DbPath::public_pictures().to_string(), "PublicPictures");
    }

    #[tokio::test]
    async fn subscription_yields_sent_snapshots_in_order() {
        let (tx, mut sub) = Subscription::channel(DbPath::new("a"));
        tx.send(None).expect("send null");
        tx.send(Some(Value::from(1))).expect("send value");
        drop(tx);

        assert_eq!(sub.next().await, Some(None));
        assert_eq!(sub.next().await, Some(Some(Value::from(1))));
        assert_eq!(sub.next().await, None);
    }

    #[test]
    fn cancelled_subscription_rejects_further_sends() {
        let (tx, sub) = Subscription::channel(DbPath::new("a"));
        sub.cancel();
        assert!(tx.send(None).is_err());
    }
}
