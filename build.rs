fn main() {
    // Tauri build embeds Windows resources (icons) and validates tauri.conf.json.
    // The library alone has no native build step.
    #[cfg(feature = "desktop")]
    tauri_build::build()
}
