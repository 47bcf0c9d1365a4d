use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides `weather.api_key`
pub const API_KEY_ENV: &str = "WEATHERBIT_API_KEY";

const APP_DIR_NAME: &str = "weatherwise";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_PREFERENCES_FILE: &str = "preferences.json";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Preference storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Weatherbit API root, e.g. https://api.weatherbit.io/v2.0
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Weatherbit API key (overridden by WEATHERBIT_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// City shown on the home screen
    #[serde(default = "default_city")]
    pub default_city: String,

    /// ISO country code narrowing the default city
    #[serde(default = "default_country")]
    pub default_country: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Refresh interval in minutes for the following home screen
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u32,
}

fn default_api_base_url() -> String {
    "https://api.weatherbit.io/v2.0".to_string()
}

fn default_city() -> String {
    "Valenzuela".to_string()
}

fn default_country() -> Option<String> {
    Some("PH".to_string())
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_refresh_minutes() -> u32 {
    15
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key: String::new(),
            default_city: default_city(),
            default_country: default_country(),
            timeout_secs: default_timeout_secs(),
            refresh_minutes: default_refresh_minutes(),
        }
    }
}

impl WeatherConfig {
    /// Check if an API key is configured (not empty or a placeholder)
    pub fn is_configured(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && !key.starts_with("YOUR_")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Preference file; relative paths resolve against the config directory
    #[serde(default)]
    pub preferences_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            weather: WeatherConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist.
    ///
    /// The API key environment override is applied after reading and is
    /// never written back to disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            let config = Self {
                config_dir: path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(default_config_dir),
                ..Self::default()
            };
            config.save_to(path)?;
            tracing::info!("Created default configuration at {}", path.display());
            config
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.weather.api_key = key;
            }
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    ///
    /// # Errors
    /// [`ConfigError::LoadFailed`] when the file cannot be read, created or
    /// parsed; [`ConfigError::Invalid`] when validation reports errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult), ConfigError> {
        let loaded = match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        };
        let config = loaded.map_err(|e| ConfigError::LoadFailed(format!("{:#}", e)))?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);

        if self.weather.default_city.trim().is_empty() {
            result.add_error("weather.default_city", "Default city must not be empty");
        }

        if let Some(country) = &self.weather.default_country {
            let country = country.trim();
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                result.add_warning(
                    "weather.default_country",
                    format!("Expected a two-letter country code, got: {:?}", country),
                );
            }
        }

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        } else if self.weather.timeout_secs > 120 {
            result.add_warning("weather.timeout_secs", "Timeout is unusually long (>120s)");
        }

        if self.weather.refresh_minutes == 0 {
            result.add_warning(
                "weather.refresh_minutes",
                "Weather refresh disabled (0 minutes)",
            );
        } else if self.weather.refresh_minutes > 1440 {
            result.add_warning(
                "weather.refresh_minutes",
                "Weather refresh interval is more than 24 hours",
            );
        }

        if !self.weather.is_configured() {
            result.add_warning(
                "weather.api_key",
                format!(
                    "Weatherbit API key not configured - set it in the config file or {}",
                    API_KEY_ENV
                ),
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Where the temperature-unit preference is stored
    pub fn preferences_path(&self) -> PathBuf {
        match &self.storage.preferences_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.config_dir.join(path),
            None => self.config_dir.join(DEFAULT_PREFERENCES_FILE),
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the default configuration file
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(APP_DIR_NAME);

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert_eq!(config.weather.default_city, "Valenzuela");
        assert_eq!(config.weather.default_country.as_deref(), Some("PH"));
    }

    #[test]
    fn test_missing_api_key_is_warning() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "weather.api_key"));
    }

    #[test]
    fn test_placeholder_api_key_not_configured() {
        let mut weather = WeatherConfig::default();
        weather.api_key = "YOUR_WEATHERBIT_KEY".to_string();
        assert!(!weather.is_configured());
        weather.api_key = "abc123".to_string();
        assert!(weather.is_configured());
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.weather.api_base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.api_base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.api_base_url = "ftp://api.weatherbit.io".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_empty_default_city_is_error() {
        let mut config = Config::default();
        config.weather.default_city = "  ".to_string();
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.weather.timeout_secs = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "weather.timeout_secs"));
    }

    #[test]
    fn test_odd_country_code_is_warning() {
        let mut config = Config::default();
        config.weather.default_country = Some("PHL".to_string());
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "weather.default_country"));
    }

    #[test]
    fn test_preferences_path_resolution() {
        let mut config = Config {
            config_dir: PathBuf::from("/tmp/ww"),
            ..Config::default()
        };
        assert_eq!(config.preferences_path(), PathBuf::from("/tmp/ww/preferences.json"));

        config.storage.preferences_file = Some(PathBuf::from("prefs/units.json"));
        assert_eq!(config.preferences_path(), PathBuf::from("/tmp/ww/prefs/units.json"));

        config.storage.preferences_file = Some(PathBuf::from("/var/lib/ww.json"));
        assert_eq!(config.preferences_path(), PathBuf::from("/var/lib/ww.json"));
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.config_dir, dir.path());
        assert_eq!(config.preferences_path(), dir.path().join("preferences.json"));
    }

    #[test]
    fn test_load_from_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "config_dir = {:?}\n\n[weather]\ndefault_city = \"Oslo\"\ndefault_country = \"NO\"\n",
                dir.path().display().to_string()
            ),
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.weather.default_city, "Oslo");
        assert_eq!(config.weather.default_country.as_deref(), Some("NO"));
        assert_eq!(config.weather.timeout_secs, 10);
        assert_eq!(config.weather.api_base_url, "https://api.weatherbit.io/v2.0");
    }

    #[test]
    fn test_load_from_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_load_validated_reports_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[weather\ndefault_city = ").unwrap();

        let err = Config::load_validated(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed(ref msg) if msg.contains("parse")));
    }

    #[test]
    fn test_load_validated_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "config_dir = {:?}\n\n[weather]\ntimeout_secs = 0\n",
                dir.path().display().to_string()
            ),
        )
        .unwrap();

        let err = Config::load_validated(Some(&path)).unwrap_err();
        match err {
            ConfigError::Invalid(summary) => assert!(summary.contains("weather.timeout_secs")),
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_load_validated_accepts_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let (config, validation) = Config::load_validated(Some(&path)).unwrap();
        assert!(validation.is_valid());
        assert_eq!(config.weather.timeout_secs, 10);
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
