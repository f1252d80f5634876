use anyhow::{Context, Result};
use rokosync_core::{DeviceConfig, JsonFileStore, SettingsStore};
use std::path::PathBuf;

/// Settings store at `path`, or the default location
pub fn settings_store(path: Option<PathBuf>) -> JsonFileStore {
    match path {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::at_default_path(),
    }
}

/// Load settings, creating the file with defaults on first run
pub fn load_settings(store: &JsonFileStore) -> Result<DeviceConfig> {
    store
        .load()
        .with_context(|| format!("Failed to load settings from {}", store.path().display()))
}

/// Print the settings that will be used for the session
pub fn print_settings(config: &DeviceConfig) {
    println!("  Rokoko Studio: {}", config.base_url());
    println!("  API key:       {}", mask_key(&config.credential));
    println!("  Clip name:     {}", config.clip_name);
    println!("  Frame rate:    {} fps", config.frame_rate);
}

/// Show only the last two characters of a key
pub fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 2 {
        return "*".repeat(count);
    }
    let tail: String = key.chars().skip(count - 2).collect();
    format!("{}{}", "*".repeat(count - 2), tail)
}
