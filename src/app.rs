//! Desktop host: plugin wiring, state and the command table.

use anyhow::Context;
use tauri::Manager;
use tracing::{debug, info};

use crate::commands::{
    apply_preset, export_items, get_settings, new_project, preset_summaries, run_task, save_preset,
    update_settings,
};
use crate::core::AppState;

// Import the window-vibrancy crate only on macOS
#[cfg(target_os = "macos")]
use window_vibrancy::{apply_vibrancy, NSVisualEffectMaterial};

/// Builds the Tauri app and runs its event loop until exit.
pub fn run() -> anyhow::Result<()> {
    let app = tauri::Builder::default()
        .plugin(tauri_plugin_process::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .plugin(tauri_plugin_os::init())
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_store::Builder::new().build())
        .invoke_handler(tauri::generate_handler![
            new_project,
            run_task,
            save_preset,
            apply_preset,
            preset_summaries,
            export_items,
            get_settings,
            update_settings,
        ])
        .setup(|app| {
            let app_handle = app.app_handle().clone();
            app.manage(AppState::new(app_handle));
            debug!("✓ AppState initialized");

            #[cfg(target_os = "macos")]
            {
                if let Some(window) = app.get_webview_window("main") {
                    info!("Applying vibrancy effect for macOS");
                    // Note: This requires macOSPrivateApi=true in tauri.conf.json
                    if let Err(e) = apply_vibrancy(&window, NSVisualEffectMaterial::HudWindow, None, None) {
                        tracing::warn!("Failed to apply vibrancy effect: {}", e);
                    }
                }
            }

            Ok(())
        })
        .build(tauri::generate_context!())
        .context("error while building tauri application")?;

    info!("Starting application event loop...");
    app.run(|_app_handle, event| {
        if let tauri::RunEvent::Exit = event {
            info!("Application exiting");
        }
    });
    Ok(())
}
