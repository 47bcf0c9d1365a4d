//! Shared application services.
//!
//! Built once per process from the loaded [`Config`] and handed to every
//! screen by reference.

use std::sync::Arc;
use std::time::Duration;

use weatherwise_core::{AppError, Config};
use weatherwise_settings::{JsonFileStore, KeyValueStore, MemoryStore, PreferenceStore};
use weatherwise_weather::{RetryConfig, WeatherProvider, WeatherQuery};

use crate::error_mapping::IntoAppError;

pub struct AppServices {
    config: Config,
    weather: Arc<WeatherProvider>,
    preferences: Arc<PreferenceStore>,
}

impl AppServices {
    /// Wire services for `config`, storing preferences in its preferences file.
    ///
    /// Falls back to an in-memory store when the preferences directory
    /// cannot be created; the unit then lasts only for this run.
    ///
    /// # Errors
    /// Fails when the weather provider cannot be built from the config.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let path = config.preferences_path();
        let dir_ready = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all);

        let storage: Arc<dyn KeyValueStore> = match dir_ready {
            Ok(()) => Arc::new(JsonFileStore::new(path)),
            Err(e) => {
                tracing::warn!(
                    "Preferences directory for {} unavailable ({}), settings will not persist",
                    path.display(),
                    e
                );
                Arc::new(MemoryStore::new())
            }
        };

        Self::with_storage(config, storage)
    }

    /// Wire services over an explicit preference backend.
    ///
    /// Must be called inside a tokio runtime: the startup preference load is
    /// spawned here and runs in the background.
    ///
    /// # Errors
    /// Fails when the weather provider cannot be built from the config.
    pub fn with_storage(config: Config, storage: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let weather = WeatherProvider::new(
            &config.weather.api_base_url,
            config.weather.api_key.clone(),
            Duration::from_secs(config.weather.timeout_secs),
        )
        .map_err(IntoAppError::into_app_error)?;

        let preferences = Arc::new(PreferenceStore::new(storage));
        preferences.spawn_initialize();

        tracing::debug!("Application services initialized");

        Ok(Self {
            config,
            weather: Arc::new(weather),
            preferences,
        })
    }

    /// Replace the HTTP retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.weather = Arc::new((*self.weather).clone().with_retry(retry));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn weather(&self) -> &WeatherProvider {
        &self.weather
    }

    pub fn preferences(&self) -> &Arc<PreferenceStore> {
        &self.preferences
    }

    /// Query for the home screen's city.
    pub fn default_query(&self) -> WeatherQuery {
        WeatherQuery::City {
            name: self.config.weather.default_city.clone(),
            country: self.config.weather.default_country.clone(),
        }
    }

    /// Home screen refresh period, `None` when refreshing is disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        match self.config.weather.refresh_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(u64::from(minutes) * 60)),
        }
    }
}
