use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{model::Coordinates, provider::ProviderKind};

pub const DEFAULT_CITY: &str = "New York";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_BASE_URL: &str = "https://api.openweathermap.org";

/// Remote endpoints; overridable so tests and self-hosted proxies can be used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather_base_url: default_weather_base_url(),
            geo_base_url: default_geo_base_url(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// provider = "openweather"
/// api_key = "..."
/// default_city = "New York"
///
/// [location]
/// lat = 51.5074
/// lon = -0.1278
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Optional provider id, "openweather" or "synthetic".
    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    /// City shown when no position is available.
    #[serde(default = "default_city")]
    pub default_city: String,

    /// Seed for synthetic data and air-quality placeholders.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Position reported by the geolocator. Absent means geolocation is unsupported.
    #[serde(default)]
    pub location: Option<Coordinates>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: None,
            default_city: default_city(),
            location: None,
            endpoints: Endpoints::default(),
            seed: None,
        }
    }
}

impl Config {
    /// Resolve which provider to construct.
    ///
    /// An explicit `provider` wins; otherwise a configured API key selects
    /// OpenWeather and its absence selects the synthetic (demo) provider.
    pub fn provider_kind(&self) -> Result<ProviderKind> {
        match self.provider.as_deref() {
            Some(s) => ProviderKind::try_from(s),
            None if self.api_key().is_some() => Ok(ProviderKind::OpenWeather),
            None => Ok(ProviderKind::Synthetic),
        }
    }

    pub fn set_provider(&mut self, kind: ProviderKind) {
        self.provider = Some(kind.as_str().to_string());
    }

    /// Returns the API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Set/replace the API key and select OpenWeather unless a provider is already chosen.
    pub fn upsert_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);

        if self.provider.is_none() {
            self.set_provider(ProviderKind::OpenWeather);
        }
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
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
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the persisted user settings (theme, units, favorites).
    pub fn settings_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("settings.json"))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "skycast", "skycast")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_weather_base_url() -> String {
    DEFAULT_WEATHER_BASE_URL.to_string()
}

fn default_geo_base_url() -> String {
    DEFAULT_GEO_BASE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_synthetic_without_api_key() {
        let cfg = Config::default();
        assert_eq!(cfg.provider_kind().unwrap(), ProviderKind::Synthetic);
        assert_eq!(cfg.default_city, "New York");
    }

    #[test]
    fn api_key_selects_openweather() {
        let mut cfg = Config::default();
        cfg.upsert_api_key("OPEN_KEY".into());

        assert_eq!(cfg.provider_kind().unwrap(), ProviderKind::OpenWeather);
        assert_eq!(cfg.api_key(), Some("OPEN_KEY"));
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let mut cfg = Config::default();
        cfg.api_key = Some("   ".into());

        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.provider_kind().unwrap(), ProviderKind::Synthetic);
    }

    #[test]
    fn upsert_does_not_override_explicit_provider() {
        let mut cfg = Config::default();
        cfg.set_provider(ProviderKind::Synthetic);
        cfg.upsert_api_key("OPEN_KEY".into());

        assert_eq!(cfg.provider_kind().unwrap(), ProviderKind::Synthetic);
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let cfg = Config { provider: Some("darksky".into()), ..Config::default() };
        let err = cfg.provider_kind().unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: Config = toml::from_str("api_key = \"K\"\n[location]\nlat = 1.5\nlon = 2.5\n")
            .expect("partial config should parse");

        assert_eq!(cfg.default_city, DEFAULT_CITY);
        assert_eq!(cfg.endpoints, Endpoints::default());
        assert_eq!(cfg.location, Some(Coordinates::new(1.5, 2.5)));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_api_key("KEY".into());
        cfg.default_city = "Oslo".into();
        cfg.seed = Some(7);
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }
}
