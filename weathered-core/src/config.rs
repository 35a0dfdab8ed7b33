use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::Coordinates;

pub const API_KEY_ENV: &str = "WEATHERED_API_KEY";
pub const API_URL_ENV: &str = "WEATHERED_API_URL";
pub const GEO_URL_ENV: &str = "WEATHERED_GEO_URL";

pub const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";

const PLACEHOLDER_KEYS: &[&str] = &[
    "your_api_key",
    "your_api_key_here",
    "your-api-key",
    "api_key",
    "changeme",
    "<api_key>",
    "xxx",
];

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// [home]
/// latitude = 48.85
/// longitude = 2.35
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    /// Weather endpoint; defaults to the OpenWeather current-weather URL.
    pub api_url: Option<String>,
    /// Geocoding endpoint; defaults to the OpenWeather direct geocoding URL.
    pub geo_url: Option<String>,
    /// Coordinates reported by the configured geolocation capability.
    pub home: Option<Coordinates>,
}

impl Config {
    /// Load config from disk (or defaults if absent) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = Self::load_from(&path)?;
        Ok(cfg.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Load config from a specific file, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config file.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weathered", "weathered")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay environment-sourced values. Non-empty variables win over the file.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_url = Some(url);
        }
        if let Some(url) = lookup(GEO_URL_ENV) {
            self.geo_url = Some(url);
        }
        self
    }

    /// Returns the API key, treating empty and placeholder values as missing.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !is_placeholder_key(key))
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn geo_url(&self) -> &str {
        self.geo_url.as_deref().unwrap_or(DEFAULT_GEO_URL)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_home(&mut self, home: Option<Coordinates>) {
        self.home = home;
    }
}

/// Whether a configured key is empty or one of the well-known template values.
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty()
        || PLACEHOLDER_KEYS
            .iter()
            .any(|placeholder| key.eq_ignore_ascii_case(placeholder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_openweather() {
        let cfg = Config::default();

        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.api_url(), DEFAULT_API_URL);
        assert_eq!(cfg.geo_url(), DEFAULT_GEO_URL);
    }

    #[test]
    fn placeholder_keys_count_as_missing() {
        let mut cfg = Config::default();

        for key in ["", "   ", "your_api_key_here", "YOUR_API_KEY", "changeme"] {
            cfg.set_api_key(key.into());
            assert_eq!(cfg.api_key(), None, "{key:?} should be treated as missing");
        }

        cfg.set_api_key(" 0123abcd ".into());
        assert_eq!(cfg.api_key(), Some("0123abcd"));
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cfg = cfg.with_env_overrides(env(&[
            (API_KEY_ENV, "ENV_KEY"),
            (API_URL_ENV, "http://localhost:9000/weather"),
        ]));

        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
        assert_eq!(cfg.api_url(), "http://localhost:9000/weather");
        assert_eq!(cfg.geo_url(), DEFAULT_GEO_URL);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cfg = cfg.with_env_overrides(env(&[(API_KEY_ENV, "  ")]));

        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.set_home(Some(Coordinates { latitude: 51.5, longitude: -0.12 }));
        cfg.save_to(&path).expect("save must succeed");

        let loaded = Config::load_from(&path).expect("load must succeed");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = Config::load_from(&dir.path().join("absent.toml")).expect("load");

        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
