//! Host application state.
//!
//! One `AppState` is built at startup and shared by everything the host runs.

use std::path::PathBuf;
use std::sync::Arc;

use easel_core::canvas::{CanvasEvents, StrokeRecorder};
use easel_core::store::Backends;
use easel_core::{AppContext, ListenerSet, MemoryBackend, PlanApi, Router, Store, StoreConfig};
use parking_lot::Mutex;
use tracing::info;

use crate::settings::{save_settings, AppSettings};

pub struct AppState {
    /// Client state and the actions that synchronize it with the backend.
    pub store: Arc<Store>,
    /// Process-wide plugins; the tracker is installed after sign-in.
    pub context: AppContext,
    /// Live backend listeners owned by the current session.
    pub listeners: Mutex<ListenerSet>,
    pub router: Router,
    /// Pointer event fan-out for the paint canvas.
    pub canvas: CanvasEvents,
    pub recorder: Arc<StrokeRecorder>,
    pub settings: AppSettings,
    /// Absolute path to `settings.json`.
    pub settings_path: PathBuf,
}

impl AppState {
    pub fn new(settings: AppSettings, settings_path: PathBuf) -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let plans: Arc<dyn PlanApi> = match settings.server_host.as_deref() {
            Some(host) => {
                info!(server_host = host, "using internal API for subscription plans");
                Arc::new(easel_core::HttpPlanApi::new(host))
            }
            None => backend.clone(),
        };
        let backends = Backends {
            identity: backend.clone(),
            db: backend,
            plans,
        };
        let store = Store::new(
            backends,
            StoreConfig {
                backend_timeout: Some(settings.backend_timeout()),
            },
        );

        let canvas = CanvasEvents::new();
        let recorder = Arc::new(StrokeRecorder::new());
        canvas.subscribe(recorder.clone());

        Self {
            store: Arc::new(store),
            context: AppContext::new(),
            listeners: Mutex::new(ListenerSet::new()),
            router: Router::new(),
            canvas,
            recorder,
            settings,
            settings_path,
        }
    }

    /// Write the cached settings to `settings_path`.
    pub fn persist_settings(&self) -> std::io::Result<()> {
        save_settings(&self.settings_path, &self.settings)
    }
}
