//! # easel-core
//!
//! Client core for the Easel paint app.
//!
//! ## Architecture
//!
//! ```text
//! UI interaction ─► EventData ─► Tracker ─► registry[tag] ─► EventHandler::handle
//!                                   │
//!                           data_with_user_info
//!
//! UI interaction ─► Store action ─► IdentityProvider / RealtimeStore / PlanApi
//!                                   │
//!                              Mutation commit ─► broadcast::Sender<MutationType>
//! ```
//!
//! Live backend subscriptions are owned by the caller through
//! [`ListenerHandle`]s; dropping a handle stops its commits.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod backend;
pub mod canvas;
pub mod context;
pub mod error;
pub mod observer;
pub mod router;
pub mod store;
pub mod tracker;

// Convenience re-exports for downstream crates
pub use backend::{
    DbPath, IdentityProvider, MemoryBackend, PlanApi, RealtimeStore, Snapshot, Subscription,
};
pub use context::{install, use_tracker, AppContext};
pub use error::EaselError;
pub use observer::{Observer, Publisher};
pub use router::{Route, Router, View};
pub use store::{ListenerHandle, ListenerSet, Store, StoreConfig};
pub use tracker::{
    EventData, EventHandler, EventType, HandlerRegistry, TrackConfig, TrackedEvent, Tracker,
    UserInfo,
};

#[cfg(feature = "http")]
pub use backend::HttpPlanApi;
