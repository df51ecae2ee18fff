//! Auth actions: account lifecycle, profile and subscription plan.

use tokio::sync::oneshot;
use tracing::{info, warn};

use super::listener::ListenerHandle;
use super::mutations::Mutation;
use super::types::{Credentials, RequestConfig, UserProfile};
use super::Store;
use crate::backend::{DbPath, User};
use crate::error::Result;

impl Store {
    /// Create an account and make it the current user.
    ///
    /// # Errors
    /// Backend failures (`WeakPassword`, `EmailAlreadyInUse`, ...) are returned
    /// unchanged so the UI can surface them.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<User> {
        let identity = &self.backends().identity;
        let user = self
            .call(identity.create_user(&credentials.email, &credentials.password))
            .await?;
        info!(uid = %user.uid, "signed up");
        self.commit(Mutation::SetUser(Some(user.clone())));
        Ok(user)
    }

    /// # Errors
    /// `InvalidCredentials` or any other backend failure, unchanged.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<()> {
        let identity = &self.backends().identity;
        let user = self
            .call(identity.sign_in(&credentials.email, &credentials.password))
            .await?;
        info!(uid = %user.uid, "signed in");
        self.commit(Mutation::SetUser(Some(user)));
        Ok(())
    }

    /// Clear local auth state, then sign out of the backend.
    ///
    /// Local state is cleared before the backend call is awaited, so a slow
    /// sign-out never leaves an authenticated UI behind.
    pub async fn log_out(&self) -> Result<()> {
        self.commit(Mutation::SetUser(None));
        self.commit(Mutation::SetProfile(None));
        self.commit(Mutation::SetPlan(None));
        self.call(self.backends().identity.sign_out()).await?;
        info!("logged out");
        Ok(())
    }

    /// Write `payload` as the current user's profile. No-op without a payload
    /// or a signed-in user.
    pub async fn create_profile(&self, payload: Option<UserProfile>) -> Result<()> {
        let (Some(profile), Some(user)) = (payload, self.current_user()) else {
            return Ok(());
        };

        let value = serde_json::to_value(&profile)?;
        self.call(self.backends().db.write(&DbPath::profile(&user.uid), value))
            .await
    }

    /// Listen to the current user's profile and commit every non-null update.
    ///
    /// Resolves once the first profile has been committed, or when the backend
    /// closes the stream first. Returns `None` without a signed-in user.
    ///
    /// # Errors
    /// Backend subscribe failures, or `Timeout` if no profile arrives within
    /// `backend_timeout`; the listener is cancelled in both cases.
    pub async fn load_profile(&self) -> Result<Option<ListenerHandle>> {
        let Some(user) = self.current_user() else {
            return Ok(None);
        };

        let path = DbPath::profile(&user.uid);
        let subscription = self.call(self.backends().db.subscribe(&path)).await?;

        let committer = self.committer();
        let (ready_tx, ready_rx) = oneshot::channel();
        let mut ready_tx = Some(ready_tx);
        let handle = ListenerHandle::spawn(subscription, move |snapshot| {
            let Some(value) = snapshot else {
                return;
            };
            match serde_json::from_value::<UserProfile>(value) {
                Ok(profile) => {
                    committer.commit(Mutation::SetProfile(Some(profile)));
                    if let Some(tx) = ready_tx.take() {
                        let _ = tx.send(());
                    }
                }
                Err(e) => warn!("ignoring malformed profile snapshot: {e}"),
            }
        });

        // A closed channel means the stream ended before any profile arrived.
        let _ = self.call(async { Ok(ready_rx.await) }).await?;
        Ok(Some(handle))
    }

    /// Fetch the current user's plan from the internal API and store it
    /// verbatim. No-op without a signed-in user.
    pub async fn get_user_subscription_plan(&self) -> Result<()> {
        let Some(user) = self.current_user() else {
            return Ok(());
        };

        let plan = self
            .call(self.backends().plans.user_subscription_plan(&user.uid))
            .await?;
        self.commit(Mutation::SetPlan(Some(plan)));
        Ok(())
    }

    /// Return `config` with a bearer token for the current user.
    ///
    /// `config` is returned unchanged when nobody is signed in or it already
    /// carries an `Authorization` header. The token is requested fresh on
    /// every call that needs one.
    pub async fn authorization_header(&self, config: RequestConfig) -> Result<RequestConfig> {
        let Some(user) = self.current_user() else {
            return Ok(config);
        };
        if config.has_authorization() {
            return Ok(config);
        }

        let token = self.call(self.backends().identity.id_token(&user)).await?;
        Ok(config.with_header(RequestConfig::AUTHORIZATION, format!("Bearer {token}")))
    }
}
