//! Tauri command handlers for the frontend.
//!
//! This module exposes commands that can be invoked from the frontend:
//! - [`new_project`], [`run_task`]: file-level operations through the task manager
//! - [`save_preset`], [`apply_preset`], [`preset_summaries`], [`export_items`]: preset helpers
//! - [`get_settings`], [`update_settings`]: persisted editor settings

mod presets;
mod settings;
mod tasks;

pub use presets::*;
pub use settings::*;
pub use tasks::*;
