//! `rokosync config`: show or change stored settings

use anyhow::{Context, Result};
use rokosync_core::{DeviceConfig, JsonFileStore, SettingsStore};
use std::path::PathBuf;

use crate::app;
use crate::args::ConfigArgs;
use crate::ui;

pub fn run(config_path: Option<PathBuf>, args: ConfigArgs) -> Result<()> {
    let store = app::settings_store(config_path);
    let mut config = app::load_settings(&store)?;

    if args.has_changes() {
        apply(&mut config, &args);
        save(&store, &config)?;
    }
    if args.show || !args.has_changes() {
        show(&store, &config)?;
    }
    Ok(())
}

/// Copy every given flag onto `config`
fn apply(config: &mut DeviceConfig, args: &ConfigArgs) {
    if let Some(ip) = &args.ip {
        config.host = ip.trim().to_string();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(key) = &args.api_key {
        config.credential = key.trim().to_string();
    }
    if let Some(name) = &args.clip_name {
        config.clip_name = name.trim().to_string();
    }
    if let Some(fps) = args.frame_rate {
        config.frame_rate = fps;
    }
}

fn save(store: &JsonFileStore, config: &DeviceConfig) -> Result<()> {
    store.save(config)?;
    ui::success(&format!("Settings saved to {}", store.path().display()));
    Ok(())
}

fn show(store: &JsonFileStore, config: &DeviceConfig) -> Result<()> {
    let mut value = serde_json::to_value(config).context("Failed to serialize settings")?;
    value["rokoko_api_key"] = app::mask_key(&config.credential).into();
    let json = serde_json::to_string_pretty(&value).context("Failed to serialize settings")?;
    println!("{json}");
    println!();
    println!("Settings file: {}", store.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_given_flags() {
        let mut config = DeviceConfig::default();
        let args = ConfigArgs {
            ip: Some(" 10.0.0.5 ".into()),
            frame_rate: Some(30),
            ..Default::default()
        };
        apply(&mut config, &args);
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.port, DeviceConfig::default().port);
        assert_eq!(config.clip_name, DeviceConfig::default().clip_name);
    }

    #[test]
    fn test_run_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let args = ConfigArgs {
            clip_name: Some("Take1".into()),
            port: Some(15000),
            ..Default::default()
        };
        run(Some(path.clone()), args).unwrap();

        let config = JsonFileStore::new(path).load().unwrap();
        assert_eq!(config.clip_name, "Take1");
        assert_eq!(config.port, 15000);
    }

    #[test]
    fn test_run_rejects_blank_clip_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let args = ConfigArgs {
            clip_name: Some("   ".into()),
            ..Default::default()
        };
        assert!(run(Some(path.clone()), args).is_err());

        let config = JsonFileStore::new(path).load().unwrap();
        assert_eq!(config.clip_name, DeviceConfig::default().clip_name);
    }

    #[test]
    fn test_run_keeps_env_key_out_of_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"rokoko_api_key": ""}"#).unwrap();
        // SAFETY: no other test in this crate reads or writes this variable
        unsafe { std::env::set_var(rokosync_core::settings::API_KEY_ENV_VAR, "s3cret-from-env") };

        let args = ConfigArgs {
            clip_name: Some("Take2".into()),
            ..Default::default()
        };
        run(Some(path.clone()), args).unwrap();

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("s3cret-from-env"));
        let config = JsonFileStore::new(path).load().unwrap();
        assert_eq!(config.clip_name, "Take2");
        assert_eq!(config.credential, "");
    }
}
