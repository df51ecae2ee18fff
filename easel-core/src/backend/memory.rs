//! `MemoryBackend` — in-process stand-in for the hosted backend.
//!
//! Implements identity, realtime store and plan lookup over plain maps so the
//! full action/mutation flow can run without network access. Paths are flat
//! keys: `u1/pictures` and `u1/profile` are independent entries.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tracing::debug;

use super::{DbPath, IdentityProvider, PlanApi, RealtimeStore, Snapshot, Subscription, User};
use crate::error::{EaselError, Result};

/// Same minimum the hosted identity provider enforces.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
}

#[derive(Debug, Default)]
struct Inner {
    /// Accounts keyed by email.
    accounts: HashMap<String, Account>,
    signed_in: Option<String>,
    tree: HashMap<DbPath, Value>,
    listeners: HashMap<DbPath, Vec<mpsc::UnboundedSender<Snapshot>>>,
    plans: HashMap<String, Value>,
    next_uid: u64,
    next_key: u64,
    tokens_issued: u64,
}

impl Inner {
    /// Push the current value at `path` to every live subscriber, dropping
    /// subscribers that went away.
    fn fan_out(&mut self, path: &DbPath) {
        let value = self.tree.get(path).cloned();
        if let Some(senders) = self.listeners.get_mut(path) {
            senders.retain(|tx| tx.send(value.clone()).is_ok());
            if senders.is_empty() {
                self.listeners.remove(path);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the plan payload returned for `uid`.
    pub fn set_plan(&self, uid: &str, plan: Value) {
        self.inner.lock().plans.insert(uid.to_string(), plan);
    }

    /// Uid of the currently signed-in account, if any.
    pub fn signed_in(&self) -> Option<String> {
        self.inner.lock().signed_in.clone()
    }

    /// Live subscribers currently attached to `path`.
    pub fn listener_count(&self, path: &DbPath) -> usize {
        let mut inner = self.inner.lock();
        if let Some(senders) = inner.listeners.get_mut(path) {
            senders.retain(|tx| !tx.is_closed());
            senders.len()
        } else {
            0
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn create_user(&self, email: &str, password: &str) -> Result<User> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(EaselError::WeakPassword);
        }

        let mut inner = self.inner.lock();
        if inner.accounts.contains_key(email) {
            return Err(EaselError::EmailAlreadyInUse(email.to_string()));
        }

        inner.next_uid += 1;
        let uid = format!("user-{}", inner.next_uid);
        inner.accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        inner.signed_in = Some(uid.clone());
        debug!(%uid, "memory backend created user");

        Ok(User {
            uid,
            email: Some(email.to_string()),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let mut inner = self.inner.lock();
        let account = match inner.accounts.get(email) {
            Some(account) if account.password == password => account.clone(),
            _ => return Err(EaselError::InvalidCredentials),
        };
        inner.signed_in = Some(account.uid.clone());

        Ok(User {
            uid: account.uid,
            email: Some(email.to_string()),
        })
    }

    async fn sign_out(&self) -> Result<()> {
        self.inner.lock().signed_in = None;
        Ok(())
    }

    async fn id_token(&self, user: &User) -> Result<String> {
        let mut inner = self.inner.lock();
        if !inner.accounts.values().any(|a| a.uid == user.uid) {
            return Err(EaselError::Backend(format!("unknown user {}", user.uid)));
        }
        inner.tokens_issued += 1;
        Ok(format!("memory-token-{}-{}", user.uid, inner.tokens_issued))
    }
}

#[async_trait]
impl RealtimeStore for MemoryBackend {
    async fn read(&self, path: &DbPath) -> Result<Snapshot> {
        Ok(self.inner.lock().tree.get(path).cloned())
    }

    async fn write(&self, path: &DbPath, value: Value) -> Result<()> {
        let mut inner = self.inner.lock();
        if value.is_null() {
            inner.tree.remove(path);
        } else {
            inner.tree.insert(path.clone(), value);
        }
        inner.fan_out(path);
        Ok(())
    }

    async fn append(&self, path: &DbPath, value: Value) -> Result<String> {
        let mut inner = self.inner.lock();
        inner.next_key += 1;
        // Fixed-width keys sort in insertion order.
        let key = format!("-M{:012}", inner.next_key);

        let entry = inner
            .tree
            .entry(path.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(children) = entry {
            children.insert(key.clone(), value);
        }
        inner.fan_out(path);
        Ok(key)
    }

    async fn subscribe(&self, path: &DbPath) -> Result<Subscription> {
        let (tx, subscription) = Subscription::channel(path.clone());
        let mut inner = self.inner.lock();
        let current = inner.tree.get(path).cloned();
        // Receiver is alive; the initial send cannot fail.
        let _ = tx.send(current);
        inner.listeners.entry(path.clone()).or_default().push(tx);
        Ok(subscription)
    }
}

#[async_trait]
impl PlanApi for MemoryBackend {
    async fn user_subscription_plan(&self, user_id: &str) -> Result<Value> {
        Ok(self
            .inner
            .lock()
            .plans
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| json!({"type": "DEFAULT_PLAN"})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_user_signs_in_and_rejects_duplicates() {
        let backend = MemoryBackend::new();
        let user = backend
            .create_user("a@x.com", "secret1")
            .await
            .expect("create user");
        assert_eq!(backend.signed_in().as_deref(), Some(user.uid.as_str()));

        let err = backend
            .create_user("a@x.com", "secret2")
            .await
            .expect_err("duplicate email");
        assert!(matches!(err, EaselError::EmailAlreadyInUse(_)));
    }

    #[tokio::test]
    async fn weak_password_and_bad_credentials_are_rejected() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.create_user("a@x.com", "123").await,
            Err(EaselError::WeakPassword)
        ));

        backend
            .create_user("a@x.com", "secret1")
            .await
            .expect("create user");
        assert!(matches!(
            backend.sign_in("a@x.com", "wrong!").await,
            Err(EaselError::InvalidCredentials)
        ));
        assert!(matches!(
            backend.sign_in("b@x.com", "secret1").await,
            Err(EaselError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn id_tokens_are_fresh_per_call() {
        let backend = MemoryBackend::new();
        let user = backend
            .create_user("a@x.com", "secret1")
            .await
            .expect("create user");

        let first = backend.id_token(&user).await.expect("token");
        let second = backend.id_token(&user).await.expect("token");
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn subscribe_delivers_current_value_then_changes() {
        let backend = MemoryBackend::new();
        let path = DbPath::pictures("u1");
        let mut sub = backend.subscribe(&path).await.expect("subscribe");

        assert_eq!(sub.next().await, Some(None));

        let key = backend
            .append(&path, json!({"picture": "data:a"}))
            .await
            .expect("append");
        let snapshot = sub.next().await.flatten().expect("value after append");
        assert_eq!(snapshot[&key]["picture"], "data:a");
    }

    #[tokio::test]
    async fn appended_keys_keep_insertion_order() {
        let backend = MemoryBackend::new();
        let path = DbPath::public_pictures();
        let first = backend.append(&path, json!("one")).await.expect("append");
        let second = backend.append(&path, json!("two")).await.expect("append");
        assert!(first < second);

        let value = backend.read(&path).await.expect("read").expect("present");
        assert_eq!(value.as_object().map(|o| o.len()), Some(2));
    }

    #[tokio::test]
    async fn writing_null_deletes_and_notifies() {
        let backend = MemoryBackend::new();
        let path = DbPath::profile("u1");
        backend.write(&path, json!({"name": "Ada"})).await.expect("write");
        let mut sub = backend.subscribe(&path).await.expect("subscribe");
        assert!(sub.next().await.flatten().is_some());

        backend.write(&path, Value::Null).await.expect("delete");
        assert_eq!(sub.next().await, Some(None));
        assert_eq!(backend.read(&path).await.expect("read"), None);
    }

    #[tokio::test]
    async fn dropped_subscriptions_are_pruned() {
        let backend = MemoryBackend::new();
        let path = DbPath::profile("u1");
        let sub = backend.subscribe(&path).await.expect("subscribe");
        assert_eq!(backend.listener_count(&path), 1);

        drop(sub);
        assert_eq!(backend.listener_count(&path), 0);
    }

    #[tokio::test]
    async fn plan_defaults_when_not_set() {
        let backend = MemoryBackend::new();
        let plan = backend.user_subscription_plan("u1").await.expect("plan");
        assert_eq!(plan["type"], "DEFAULT_PLAN");

        backend.set_plan("u1", json!({"type": "PREMIUM_PLAN"}));
        let plan = backend.user_subscription_plan("u1").await.expect("plan");
        assert_eq!(plan["type"], "PREMIUM_PLAN");
    }
}
