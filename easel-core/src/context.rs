//! Application-scoped context.
//!
//! `AppContext` holds the process-wide plugins (currently the [`Tracker`]).
//! Hosts create one context, `install` the tracker into it and pass the
//! context (or an `Arc` of it) to anything that needs to track events.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use crate::error::{EaselError, Result};
use crate::tracker::{HandlerRegistry, TrackConfig, Tracker};

#[derive(Debug, Default)]
pub struct AppContext {
    tracker: OnceLock<Arc<Tracker>>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_tracker(&self) -> bool {
        self.tracker.get().is_some()
    }
}

/// Construct the tracker and install it into `ctx`.
///
/// The tracker is built once per context: a repeated install returns the
/// already-installed instance and ignores the new configuration.
///
/// # Errors
/// `EaselError::UnboundHandler` if `events` leaves an event type unbound.
pub fn install(
    ctx: &AppContext,
    config: TrackConfig,
    events: HandlerRegistry,
) -> Result<Arc<Tracker>> {
    if let Some(existing) = ctx.tracker.get() {
        debug!("tracker already installed, keeping existing instance");
        return Ok(Arc::clone(existing));
    }

    if let Some(&unbound) = events.missing().first() {
        return Err(EaselError::UnboundHandler(unbound));
    }

    let uid = config.user_info.uid.clone();
    let tracker = ctx
        .tracker
        .get_or_init(|| Arc::new(Tracker::new(config, events)));
    info!(%uid, "tracker installed");
    Ok(Arc::clone(tracker))
}

/// Retrieve the installed tracker.
///
/// # Errors
/// `EaselError::NotProvided` if [`install`] has not run on `ctx`.
pub fn use_tracker(ctx: &AppContext) -> Result<Arc<Tracker>> {
    ctx.tracker.get().cloned().ok_or(EaselError::NotProvided)
}
