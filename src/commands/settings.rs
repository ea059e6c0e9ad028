use tauri::State;
use tracing::info;

use crate::core::{AppState, EditorConfig};
use crate::utils::EditorResult;

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> EditorResult<EditorConfig> {
    Ok(state.manager().lock().await.config().clone())
}

/// Validates and persists new settings; they apply to the next task.
#[tauri::command]
pub async fn update_settings(
    state: State<'_, AppState>,
    config: EditorConfig,
) -> EditorResult<EditorConfig> {
    let config = state.update_config(config).await?;
    info!("Settings updated");
    Ok(config)
}
