//! Settings persistence.
//!
//! The coordinator never touches the filesystem directly; it reads a fresh
//! snapshot through [`SettingsStore::load_effective`] on every begin/end, so
//! edits made while idle or recording apply to the next attempt.
//!
//! `load` returns exactly what is stored. The `ROKOKO_API_KEY` fallback is
//! only applied to effective snapshots and is never written back.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{DeviceConfig, SettingsError};

/// Load/save access to the device settings.
pub trait SettingsStore: Send + Sync {
    /// Stored settings, as persisted
    fn load(&self) -> Result<DeviceConfig, SettingsError>;

    /// Validate and persist settings
    fn save(&self, config: &DeviceConfig) -> Result<(), SettingsError>;

    /// Settings a device call should use: stored values plus the
    /// environment credential fallback
    fn load_effective(&self) -> Result<DeviceConfig, SettingsError> {
        Ok(self.load()?.with_env_fallback())
    }
}

/// Saving accepts an empty stored key when the environment supplies one
fn validate_for_save(config: &DeviceConfig) -> Result<(), SettingsError> {
    config.clone().with_env_fallback().validate()
}

/// Default location: `<config dir>/rokosync/settings.json`
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rokosync")
        .join("settings.json")
}

/// JSON-file backed settings.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`default_settings_path`]
    pub fn at_default_path() -> Self {
        Self::new(default_settings_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn write(&self, config: &DeviceConfig) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(config).map_err(|e| SettingsError::Parse {
            path: self.path.display().to_string(),
            source: e,
        })?;

        // Write-then-rename so a crash never leaves a truncated file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<DeviceConfig, SettingsError> {
        if !self.path.exists() {
            crate::verbose!("Creating settings file at {}", self.path.display());
            let config = DeviceConfig::default();
            self.write(&config)?;
            return Ok(config);
        }

        let text = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let parse_error = |source| SettingsError::Parse {
            path: self.path.display().to_string(),
            source,
        };
        let raw: serde_json::Value = serde_json::from_str(&text).map_err(parse_error)?;
        let config: DeviceConfig = serde_json::from_value(raw.clone()).map_err(parse_error)?;

        // Persist back-filled defaults so the file documents every key
        let complete = raw
            .as_object()
            .is_some_and(|object| DeviceConfig::KEYS.iter().all(|k| object.contains_key(*k)));
        if !complete {
            crate::verbose!("Back-filling missing keys in {}", self.path.display());
            self.write(&config)?;
        }

        Ok(config)
    }

    fn save(&self, config: &DeviceConfig) -> Result<(), SettingsError> {
        validate_for_save(config)?;
        self.write(config)
    }
}

/// In-memory settings, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: Mutex<DeviceConfig>,
}

impl MemoryStore {
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<DeviceConfig, SettingsError> {
        Ok(self
            .config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, config: &DeviceConfig) -> Result<(), SettingsError> {
        validate_for_save(config)?;
        *self
            .config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take1() -> DeviceConfig {
        DeviceConfig {
            host: "10.0.0.5".into(),
            port: 14053,
            credential: "abc".into(),
            clip_name: "Take1".into(),
            frame_rate: 30,
        }
    }

    #[test]
    fn test_load_creates_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let store = JsonFileStore::new(&path);

        let config = store.load().unwrap();
        assert_eq!(config.port, DeviceConfig::default().port);
        assert_eq!(config.host, DeviceConfig::default().host);
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("settings.json"));

        store.save(&take1()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.host, "10.0.0.5");
        assert_eq!(loaded.port, 14053);
        assert_eq!(loaded.credential, "abc");
        assert_eq!(loaded.clip_name, "Take1");
        assert_eq!(loaded.frame_rate, 30);
    }

    #[test]
    fn test_load_back_fills_and_rewrites_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"rokoko_clip_name": "Dance"}"#).unwrap();

        let store = JsonFileStore::new(&path);
        let config = store.load().unwrap();
        assert_eq!(config.clip_name, "Dance");
        assert_eq!(config.frame_rate, 60);

        let rewritten: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rewritten["rokoko_port"], 14053);
        assert_eq!(rewritten["rokoko_clip_name"], "Dance");
    }

    #[test]
    fn test_save_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = JsonFileStore::new(&path);

        let bad = DeviceConfig {
            clip_name: String::new(),
            ..take1()
        };
        assert!(matches!(
            store.save(&bad),
            Err(SettingsError::Invalid { field: "rokoko_clip_name", .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::default();
        store.save(&take1()).unwrap();
        assert_eq!(store.load().unwrap(), take1());
        assert!(store
            .save(&DeviceConfig {
                port: 0,
                ..take1()
            })
            .is_err());
        assert_eq!(store.load().unwrap(), take1());
    }

    #[test]
    fn test_env_credential_is_never_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"rokoko_api_key": ""}"#).unwrap();
        // SAFETY: no other test in this crate reads or writes this variable
        unsafe { std::env::set_var(crate::settings::API_KEY_ENV_VAR, "key-from-env") };

        let store = JsonFileStore::new(&path);
        let stored = store.load().unwrap();
        assert_eq!(stored.credential, "");
        assert_eq!(store.load_effective().unwrap().credential, "key-from-env");

        let edited = DeviceConfig {
            clip_name: "Take2".into(),
            ..stored
        };
        store.save(&edited).unwrap();

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("key-from-env"));
        assert!(on_disk.contains("Take2"));
    }
}
