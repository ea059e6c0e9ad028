// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use tracing::info;

fn main() -> anyhow::Result<()> {
    layerforge_lib::utils::init_logging("layerforge_lib=debug,info");
    info!("=== Application Starting ===");
    layerforge_lib::run()
}
