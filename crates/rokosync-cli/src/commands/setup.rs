//! Setup wizard
//!
//! Prompts for every device setting, using the stored values as defaults,
//! and saves only after the user confirms. Each answer is checked with
//! [`DeviceConfig::validate`] on the config built so far.

use anyhow::Result;
use rokosync_core::{DeviceConfig, SettingsError, SettingsStore};
use std::path::PathBuf;

use crate::app;
use crate::ui;

pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let store = app::settings_store(config_path);
    let mut config = app::load_settings(&store)?;

    ui::header("rokosync setup");
    println!("Rokoko Studio: enable the Command API under Settings > Command API.");
    println!("Audacity: enable mod-script-pipe under Preferences > Modules, then restart it.");
    println!();

    let host = ui::input_validated("Rokoko Studio IP", &config.host, |v| {
        check_field(with_host(&config, v), "rokoko_ip")
    })?;
    config = with_host(&config, &host);

    let port = ui::input_validated("Command API port", &config.port.to_string(), |v| {
        check_field(with_port(&config, v)?, "rokoko_port")
    })?;
    config = with_port(&config, &port).map_err(anyhow::Error::msg)?;

    let key = ui::input_validated("Command API key", &config.credential, |v| {
        check_field(with_key(&config, v), "rokoko_api_key")
    })?;
    config = with_key(&config, &key);

    let clip = ui::input_validated("Clip name", &config.clip_name, |v| {
        check_field(with_clip(&config, v), "rokoko_clip_name")
    })?;
    config = with_clip(&config, &clip);

    let fps = ui::input_validated("Frame rate (fps)", &config.frame_rate.to_string(), |v| {
        check_field(with_frame_rate(&config, v)?, "rokoko_frame_rate")
    })?;
    config = with_frame_rate(&config, &fps).map_err(anyhow::Error::msg)?;

    println!();
    app::print_settings(&config);
    println!();

    if !ui::confirm("Save these settings?", true)? {
        ui::info("Nothing saved");
        return Ok(());
    }

    store.save(&config)?;
    ui::success(&format!("Settings saved to {}", store.path().display()));
    Ok(())
}

/// Reject `candidate` only if validation fails on `field`.
///
/// Prompts follow the order `validate` checks fields in, so earlier fields
/// are already valid and later ones are prompted for next.
fn check_field(candidate: DeviceConfig, field: &'static str) -> Result<(), String> {
    match candidate.with_env_fallback().validate() {
        Err(SettingsError::Invalid { field: failed, reason }) if failed == field => Err(reason),
        _ => Ok(()),
    }
}

fn with_host(config: &DeviceConfig, value: &str) -> DeviceConfig {
    DeviceConfig {
        host: value.trim().to_string(),
        ..config.clone()
    }
}

fn with_port(config: &DeviceConfig, value: &str) -> Result<DeviceConfig, String> {
    let port = value
        .trim()
        .parse::<u16>()
        .map_err(|_| "port must be a number between 1 and 65535".to_string())?;
    Ok(DeviceConfig {
        port,
        ..config.clone()
    })
}

fn with_key(config: &DeviceConfig, value: &str) -> DeviceConfig {
    DeviceConfig {
        credential: value.trim().to_string(),
        ..config.clone()
    }
}

fn with_clip(config: &DeviceConfig, value: &str) -> DeviceConfig {
    DeviceConfig {
        clip_name: value.trim().to_string(),
        ..config.clone()
    }
}

fn with_frame_rate(config: &DeviceConfig, value: &str) -> Result<DeviceConfig, String> {
    let frame_rate = value
        .trim()
        .parse::<u32>()
        .map_err(|_| "frame rate must be a whole number".to_string())?;
    Ok(DeviceConfig {
        frame_rate,
        ..config.clone()
    })
}
