//! Device settings shared by both adapters.
//!
//! The on-disk format is a flat JSON object with `rokoko_*` keys. Every field
//! carries its own serde default so a file with missing keys still loads.

mod store;

pub use store::{JsonFileStore, MemoryStore, SettingsStore, default_settings_path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable consulted when no credential is stored
pub const API_KEY_ENV_VAR: &str = "ROKOKO_API_KEY";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 14053;
pub const DEFAULT_API_KEY: &str = "1234";
pub const DEFAULT_CLIP_NAME: &str = "Clip";
pub const DEFAULT_FRAME_RATE: u32 = 60;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Settings file error ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings file ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Connection and take settings for a recording session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Host running Rokoko Studio
    #[serde(rename = "rokoko_ip", default = "default_host")]
    pub host: String,

    /// Command API port (1-65535)
    #[serde(rename = "rokoko_port", default = "default_port")]
    pub port: u16,

    /// Command API key, part of the request path
    #[serde(rename = "rokoko_api_key", default = "default_api_key")]
    pub credential: String,

    /// Clip name Rokoko assigns to the take
    #[serde(rename = "rokoko_clip_name", default = "default_clip_name")]
    pub clip_name: String,

    #[serde(rename = "rokoko_frame_rate", default = "default_frame_rate")]
    pub frame_rate: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_api_key() -> String {
    DEFAULT_API_KEY.to_string()
}

fn default_clip_name() -> String {
    DEFAULT_CLIP_NAME.to_string()
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            credential: default_api_key(),
            clip_name: default_clip_name(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl DeviceConfig {
    /// JSON keys of the settings file, in file order
    pub const KEYS: [&'static str; 5] = [
        "rokoko_ip",
        "rokoko_port",
        "rokoko_api_key",
        "rokoko_clip_name",
        "rokoko_frame_rate",
    ];

    /// Reject values that would only fail later at the device boundary.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.host.trim().is_empty() {
            return Err(invalid("rokoko_ip", "host must not be empty"));
        }
        if self.host.trim().contains(['/', ' ']) {
            return Err(invalid(
                "rokoko_ip",
                format!("expected a bare host or IP address, got '{}'", self.host),
            ));
        }
        if self.port == 0 {
            return Err(invalid("rokoko_port", "port must be between 1 and 65535"));
        }
        if self.credential.trim().is_empty() {
            return Err(invalid("rokoko_api_key", "API key must not be empty"));
        }
        if self.clip_name.trim().is_empty() {
            return Err(invalid("rokoko_clip_name", "clip name must not be empty"));
        }
        if self.frame_rate == 0 {
            return Err(invalid("rokoko_frame_rate", "frame rate must be at least 1"));
        }
        Ok(())
    }

    /// Fill an empty credential from `ROKOKO_API_KEY`.
    pub fn with_env_fallback(mut self) -> Self {
        if self.credential.trim().is_empty()
            && let Ok(key) = std::env::var(API_KEY_ENV_VAR)
            && !key.trim().is_empty()
        {
            self.credential = key;
        }
        self
    }

    /// Base URL of the Rokoko command API
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host.trim(), self.port)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_are_back_filled() {
        let config: DeviceConfig =
            serde_json::from_str(r#"{"rokoko_ip": "10.0.0.9", "rokoko_frame_rate": 24}"#).unwrap();
        assert_eq!(config.host, "10.0.0.9");
        assert_eq!(config.frame_rate, 24);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.credential, DEFAULT_API_KEY);
        assert_eq!(config.clip_name, DEFAULT_CLIP_NAME);
    }

    #[test]
    fn test_serializes_with_file_keys() {
        let value = serde_json::to_value(DeviceConfig::default()).unwrap();
        let object = value.as_object().unwrap();
        for key in DeviceConfig::KEYS {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), DeviceConfig::KEYS.len());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DeviceConfig::default();
        assert!(config.validate().is_ok());

        config.port = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Invalid { field: "rokoko_port", .. })
        ));

        let config = DeviceConfig {
            clip_name: "  ".into(),
            ..DeviceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Invalid { field: "rokoko_clip_name", .. })
        ));

        let config = DeviceConfig {
            frame_rate: 0,
            ..DeviceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DeviceConfig {
            host: "http://10.0.0.5".into(),
            ..DeviceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_port_fails_to_parse() {
        let result = serde_json::from_str::<DeviceConfig>(r#"{"rokoko_port": 70000}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url() {
        let config = DeviceConfig {
            host: "10.0.0.5".into(),
            port: 14053,
            ..DeviceConfig::default()
        };
        assert_eq!(config.base_url(), "http://10.0.0.5:14053");
    }
}
