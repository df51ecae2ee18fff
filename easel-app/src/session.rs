//! Scripted drawing session run by the host binary.
//!
//! Exercises the full client flow against the configured backends: account,
//! tracker, profile, canvas, pictures, plan and log-out.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use easel_core::canvas::{PointerEvent, PointerKind};
use easel_core::store::{Credentials, DbRecord, MutationType, UserProfile};
use easel_core::tracker::{ForwardHandler, LogHandler};
use easel_core::{
    install, use_tracker, EaselError, EventData, EventType, HandlerRegistry, TrackConfig,
    UserInfo,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::state::AppState;

const DEFAULT_EMAIL: &str = "demo@easel.local";
const DEFAULT_PASSWORD: &str = "easel-demo";
const COMMIT_WAIT: Duration = Duration::from_secs(2);

/// Sample gesture drawn by the scripted session.
const GESTURE: &[(PointerKind, f32, f32)] = &[
    (PointerKind::Down, 10.0, 10.0),
    (PointerKind::Move, 20.0, 15.0),
    (PointerKind::Move, 30.0, 25.0),
    (PointerKind::Up, 30.0, 25.0),
    (PointerKind::Down, 50.0, 50.0),
    (PointerKind::Move, 60.0, 40.0),
    (PointerKind::Up, 60.0, 40.0),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub uid: String,
    pub strokes: usize,
    pub pictures: usize,
    pub tracked_events: u64,
    pub premium: bool,
    pub plan: Option<serde_json::Value>,
}

/// Credentials from `EASEL_EMAIL` / `EASEL_PASSWORD`, with demo defaults.
pub fn credentials_from_env() -> Credentials {
    let email = std::env::var("EASEL_EMAIL").unwrap_or_else(|_| DEFAULT_EMAIL.into());
    let password = std::env::var("EASEL_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.into());
    Credentials::new(email, password)
}

pub async fn run(state: &AppState, credentials: &Credentials) -> Result<SessionSummary> {
    let store = &state.store;
    let mut changes = store.subscribe();

    let user = match store.sign_up(credentials).await {
        Ok(user) => user,
        Err(EaselError::EmailAlreadyInUse(email)) => {
            debug!(%email, "account exists, signing in");
            store.sign_in(credentials).await?;
            store.current_user().context("sign-in left no current user")?
        }
        Err(e) => return Err(e).context("sign up failed"),
    };

    let forward = Arc::new(ForwardHandler::new());
    if state.settings.track_events {
        let registry = HandlerRegistry::uniform(Arc::new(LogHandler))
            .with(EventType::ButtonClick, forward.clone());
        install(
            &state.context,
            TrackConfig {
                user_info: UserInfo {
                    name: None,
                    email: credentials.email.clone(),
                    uid: user.uid.clone(),
                },
            },
            registry,
        )?;
    }

    track(state, state.router.route_change("/sign-up", "/new-canvas"));

    store
        .create_profile(Some(UserProfile {
            email: Some(credentials.email.clone()),
            ..Default::default()
        }))
        .await?;
    if let Some(listener) = store.load_profile().await? {
        state.listeners.lock().push(listener);
    }
    if let Some(listener) = store.load_pictures().await {
        state.listeners.lock().push(listener);
    }

    draw(state);
    let strokes = state.recorder.strokes();
    let picture = format!(
        "data:application/json,{}",
        serde_json::to_string(&strokes).context("encode strokes")?
    );
    let record = DbRecord::new(picture).named("sketch");
    store.save_picture(Some(record.clone())).await?;
    track(state, EventData::button_click("save").with_field("strokes", strokes.len()));
    wait_until(&mut changes, || store.pictures().values().any(|r| *r == record)).await;

    if let Err(e) = store.get_user_subscription_plan().await {
        warn!("subscription plan unavailable: {e}");
    }

    let summary = SessionSummary {
        uid: user.uid,
        strokes: strokes.len(),
        pictures: store.pictures().len(),
        tracked_events: forward.forwarded(),
        premium: store.is_user_premium(),
        plan: store.plan(),
    };

    let released = state.listeners.lock().release_all();
    debug!(released, "listeners released");
    store.log_out().await?;
    state.recorder.clear();
    info!(uid = %summary.uid, pictures = summary.pictures, "session finished");
    Ok(summary)
}

fn draw(state: &AppState) {
    for &(kind, x, y) in GESTURE {
        state.canvas.notify(Some(&PointerEvent::new(kind, x, y)));
    }
}

/// Dispatch `event` to the installed tracker. Returns whether it was handled.
fn track(state: &AppState, event: EventData) -> bool {
    if !state.settings.track_events {
        debug!(event_type = %event.event_type(), "tracking disabled");
        return false;
    }
    let result = use_tracker(&state.context).and_then(|tracker| tracker.track(&event));
    if let Err(e) = result {
        warn!(event_type = %event.event_type(), "failed to track event: {e}");
        return false;
    }
    true
}

/// Wait briefly for committed state to satisfy `done`; listener updates
/// arrive asynchronously.
async fn wait_until<F>(changes: &mut broadcast::Receiver<MutationType>, done: F)
where
    F: Fn() -> bool,
{
    let wait = async {
        while !done() {
            match changes.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    };
    if tokio::time::timeout(COMMIT_WAIT, wait).await.is_err() {
        warn!("timed out waiting for listener commit");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::settings::AppSettings;

    fn state(track_events: bool) -> AppState {
        AppState::new(
            AppSettings {
                track_events,
                ..Default::default()
            },
            PathBuf::from("settings.json"),
        )
    }

    #[tokio::test]
    async fn session_saves_drawing_and_logs_out() {
        let state = state(true);
        let credentials = Credentials::new("painter@easel.local", "secret-pw");

        let summary = run(&state, &credentials).await.expect("session");

        assert_eq!(summary.strokes, 2);
        assert_eq!(summary.pictures, 1);
        assert_eq!(summary.tracked_events, 1);
        assert_eq!(
            summary.plan,
            Some(serde_json::json!({"type": "DEFAULT_PLAN"}))
        );
        assert!(!state.store.is_user_authenticated());
        assert!(state.listeners.lock().is_empty());
    }

    fn user_info() -> UserInfo {
        UserInfo {
            name: None,
            email: "painter@easel.local".into(),
            uid: "u1".into(),
        }
    }

    #[test]
    fn track_reports_missing_tracker_when_enabled() {
        let state = state(true);
        assert!(!track(&state, EventData::button_click("save")));

        install(
            &state.context,
            TrackConfig {
                user_info: user_info(),
            },
            HandlerRegistry::uniform(Arc::new(LogHandler)),
        )
        .expect("install");
        assert!(track(&state, EventData::button_click("save")));
    }

    #[test]
    fn track_is_skipped_when_disabled() {
        let state = state(false);
        install(
            &state.context,
            TrackConfig {
                user_info: user_info(),
            },
            HandlerRegistry::uniform(Arc::new(LogHandler)),
        )
        .expect("install");

        assert!(!track(&state, EventData::button_click("save")));
    }

    #[tokio::test]
    async fn second_session_signs_in_to_existing_account() {
        let state = state(false);
        let credentials = Credentials::new("painter@easel.local", "secret-pw");

        let first = run(&state, &credentials).await.expect("first session");
        let second = run(&state, &credentials).await.expect("second session");

        assert_eq!(first.uid, second.uid);
        assert_eq!(second.pictures, 2);
        assert_eq!(second.tracked_events, 0);
        assert!(!state.context.has_tracker());
    }
}
