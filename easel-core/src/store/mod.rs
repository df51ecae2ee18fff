//! Centralized client state synchronized with the backend.
//!
//! ## Write discipline
//!
//! ```text
//! caller ─► Store action (async) ─► backend call ─► commit(Mutation) ─► RootState
//!                                                        │
//!                                   broadcast::Sender<MutationType> ─► views
//! ```
//!
//! Only mutations write state and only actions commit mutations. Concurrent
//! actions committing to the same slice race last-write-wins; no extra locking
//! is added on top of the state lock.

pub mod auth;
pub mod listener;
pub mod mutations;
pub mod pictures;
pub mod types;

pub use listener::{ListenerHandle, ListenerSet};
pub use mutations::{AuthState, Mutation, MutationType, PicturesState, RootState};
pub use types::{
    Credentials, DbRecord, Pictures, PublicPictures, RequestConfig, UserPlan, UserPlanType,
    UserProfile,
};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::backend::{IdentityProvider, MemoryBackend, PlanApi, RealtimeStore, User};
use crate::error::{EaselError, Result};

/// Broadcast channel capacity: 256 change notifications buffered for slow views.
const CHANGES_CAP: usize = 256;

#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Upper bound on every one-shot backend call. `None` waits indefinitely.
    /// Live subscriptions are not bounded.
    pub backend_timeout: Option<Duration>,
}

/// Backend collaborators used by store actions.
#[derive(Clone)]
pub struct Backends {
    pub identity: Arc<dyn IdentityProvider>,
    pub db: Arc<dyn RealtimeStore>,
    pub plans: Arc<dyn PlanApi>,
}

impl Backends {
    /// Use one in-process backend for every collaborator.
    pub fn memory(backend: Arc<MemoryBackend>) -> Self {
        Self {
            identity: backend.clone(),
            db: backend.clone(),
            plans: backend,
        }
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

/// Write side of the state, cloned into listener tasks.
#[derive(Clone)]
pub(crate) struct Committer {
    state: Arc<RwLock<RootState>>,
    changes: broadcast::Sender<MutationType>,
}

impl Committer {
    pub(crate) fn commit(&self, mutation: Mutation) {
        let kind = mutation.kind();
        mutation.apply(&mut self.state.write());
        debug!(mutation = %kind, "committed");
        let _ = self.changes.send(kind);
    }
}

pub struct Store {
    committer: Committer,
    backends: Backends,
    config: StoreConfig,
}

impl Store {
    pub fn new(backends: Backends, config: StoreConfig) -> Self {
        let (changes, _) = broadcast::channel(CHANGES_CAP);
        Self {
            committer: Committer {
                state: Arc::new(RwLock::new(RootState::default())),
                changes,
            },
            backends,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Subscribe to the tag of every committed mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<MutationType> {
        self.committer.changes.subscribe()
    }

    /// Full state snapshot.
    pub fn state(&self) -> RootState {
        self.committer.state.read().clone()
    }

    // ── Getters ──────────────────────────────────────────────────────────────

    pub fn current_user(&self) -> Option<User> {
        self.committer.state.read().auth.current_user.clone()
    }

    pub fn user_profile(&self) -> Option<UserProfile> {
        self.committer.state.read().auth.user_profile.clone()
    }

    pub fn plan(&self) -> Option<Value> {
        self.committer.state.read().auth.plan.clone()
    }

    pub fn pictures(&self) -> Pictures {
        self.committer.state.read().pictures.pictures.clone()
    }

    pub fn public_pictures(&self) -> PublicPictures {
        self.committer.state.read().pictures.public_pictures.clone()
    }

    pub fn is_user_authenticated(&self) -> bool {
        self.committer.state.read().auth.current_user.is_some()
    }

    pub fn is_user_premium(&self) -> bool {
        self.profile_plan_type() == Some(UserPlanType::PremiumPlan)
    }

    pub fn is_default_user(&self) -> bool {
        self.profile_plan_type() == Some(UserPlanType::DefaultPlan)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    pub(crate) fn commit(&self, mutation: Mutation) {
        self.committer.commit(mutation);
    }

    pub(crate) fn committer(&self) -> Committer {
        self.committer.clone()
    }

    pub(crate) fn backends(&self) -> &Backends {
        &self.backends
    }

    /// Await a backend call, bounded by `backend_timeout` when configured.
    pub(crate) async fn call<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.config.backend_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| EaselError::Timeout(limit))?,
            None => fut.await,
        }
    }

    fn profile_plan_type(&self) -> Option<UserPlanType> {
        self.committer
            .state
            .read()
            .auth
            .user_profile
            .as_ref()
            .and_then(UserProfile::plan_type)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
