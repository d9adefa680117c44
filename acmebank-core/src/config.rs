//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": {
//!     "demoMode": false,
//!     "currency": "COP",
//!     "recentLimit": 5,
//!     "minPasswordLength": 8,
//!     "defaultIdType": "cc"
//!   }
//! }
//! ```
//! Fields this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

const SETTINGS_FILE: &str = "settings.json";

/// Environment variable overriding `demoMode`
pub const DEMO_MODE_ENV: &str = "ACMEBANK_DEMO_MODE";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recent_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_password_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_id_type: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Bank configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub demo_mode: bool,
    /// ISO 4217 code used when formatting amounts
    pub currency: String,
    /// How many transactions the summary shows
    pub recent_limit: usize,
    pub min_password_length: usize,
    /// Id type assumed when logging in with a bare id number
    pub default_id_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            currency: "COP".to_string(),
            recent_limit: 5,
            min_password_length: 8,
            default_id_type: "cc".to_string(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Demo mode can be enabled via:
    /// 1. Settings file (`acme demo on`)
    /// 2. Environment variable ACMEBANK_DEMO_MODE (for CI/testing)
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        let defaults = Config::default();

        let demo_mode = match std::env::var(DEMO_MODE_ENV).ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.app.demo_mode,
        };

        let config = Self {
            demo_mode,
            currency: raw.app.currency.unwrap_or(defaults.currency),
            recent_limit: raw.app.recent_limit.unwrap_or(defaults.recent_limit),
            min_password_length: raw
                .app
                .min_password_length
                .unwrap_or(defaults.min_password_length),
            default_id_type: raw.app.default_id_type.unwrap_or(defaults.default_id_type),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            return Err(Error::Config("currency cannot be empty".to_string()));
        }
        if self.recent_limit == 0 {
            return Err(Error::Config("recentLimit must be at least 1".to_string()));
        }
        if self.default_id_type.trim().is_empty() {
            return Err(Error::Config("defaultIdType cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        settings.app.demo_mode = self.demo_mode;
        settings.app.currency = Some(self.currency.clone());
        settings.app.recent_limit = Some(self.recent_limit);
        settings.app.min_password_length = Some(self.min_password_length);
        settings.app.default_id_type = Some(self.default_id_type.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Enable demo mode
    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    /// Disable demo mode
    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", SETTINGS_FILE, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.currency, "COP");
        assert_eq!(config.recent_limit, 5);
        assert_eq!(config.min_password_length, 8);
        assert_eq!(config.default_id_type, "cc");
    }

    #[test]
    fn test_save_preserves_unmanaged_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"app": {"theme": "dark", "recentLimit": 10}, "ui": {"lang": "es"}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.recent_limit, 10);
        config.currency = "USD".to_string();
        config.save(dir.path()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap())
                .unwrap();
        assert_eq!(raw["app"]["theme"], "dark");
        assert_eq!(raw["app"]["currency"], "USD");
        assert_eq!(raw["ui"]["lang"], "es");
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{"app": {"recentLimit": 0}}"#).unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));

        std::fs::write(dir.path().join(SETTINGS_FILE), "not json").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));
    }
}
