//! Application state management for Tauri.

use tauri::{AppHandle, Wry};
use tauri_plugin_store::StoreExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::core::EditorConfig;
use crate::processing::{Compositor, SourceDecoder};
use crate::project::FsResolver;
use crate::sink::DialogSink;
use crate::tasks::TaskManager;
use crate::utils::{EditorError, EditorResult};

/// Store file holding persisted settings.
pub const SETTINGS_STORE: &str = "settings.json";
/// Key of the [`EditorConfig`] inside the settings store.
pub const CONFIG_KEY: &str = "editorConfig";

pub type DesktopTaskManager = TaskManager<Compositor<SourceDecoder>, DialogSink, FsResolver>;

/// Application state managed by Tauri.
///
/// Owns the task manager; commands lock it for the duration of one task, which keeps
/// file operations from the frontend strictly one at a time.
pub struct AppState {
    app_handle: AppHandle<Wry>,
    manager: Mutex<DesktopTaskManager>,
}

impl AppState {
    /// Creates the state, restoring settings from the store when present.
    pub fn new(app: AppHandle<Wry>) -> Self {
        let config = load_config(&app).unwrap_or_else(|e| {
            warn!("Using default settings: {}", e);
            EditorConfig::default()
        });
        debug!("Editor settings loaded: {:?}", config);

        let manager = TaskManager::new(
            Compositor::new(SourceDecoder),
            DialogSink::new(app.clone()),
            FsResolver,
            config,
        );

        Self {
            app_handle: app,
            manager: Mutex::new(manager),
        }
    }

    pub fn manager(&self) -> &Mutex<DesktopTaskManager> {
        &self.manager
    }

    /// Validates, persists and activates new settings.
    pub async fn update_config(&self, config: EditorConfig) -> EditorResult<EditorConfig> {
        config.validate()?;

        let store = self
            .app_handle
            .store(SETTINGS_STORE)
            .map_err(|e| EditorError::config(format!("Settings store unavailable: {e}")))?;
        store.set(CONFIG_KEY, serde_json::to_value(&config)?);
        store
            .save()
            .map_err(|e| EditorError::config(format!("Failed to persist settings: {e}")))?;

        self.manager.lock().await.set_config(config.clone());
        Ok(config)
    }
}

fn load_config(app: &AppHandle<Wry>) -> EditorResult<EditorConfig> {
    let store = app
        .store(SETTINGS_STORE)
        .map_err(|e| EditorError::config(format!("Settings store unavailable: {e}")))?;

    match store.get(CONFIG_KEY) {
        Some(value) => {
            let config: EditorConfig = serde_json::from_value(value)
                .map_err(|e| EditorError::config(format!("Stored settings are invalid: {e}")))?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(EditorConfig::default()),
    }
}
