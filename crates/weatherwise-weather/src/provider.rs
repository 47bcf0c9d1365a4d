//! Weatherbit current-conditions client.

use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::retry::{with_retry, RetryConfig};
use crate::types::{CurrentResponse, CurrentWeather, ErrorResponse, WeatherError, WeatherQuery};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherbit.io/v2.0";
const USER_AGENT: &str = concat!("WeatherWise/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl WeatherProvider {
    /// Create a provider for the API rooted at `base_url`.
    ///
    /// # Errors
    /// Fails when `base_url` is not an http(s) URL or the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| WeatherError::InvalidRequest(format!("Invalid base URL: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(WeatherError::InvalidRequest(format!(
                "Base URL must use http or https, got: {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn current_url(&self, query: &WeatherQuery) -> Result<Url, WeatherError> {
        let endpoint = format!("{}/current", self.base_url);
        let mut params: Vec<(&str, String)> = Vec::with_capacity(4);

        match query {
            WeatherQuery::City { name, country } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(WeatherError::InvalidRequest(
                        "City name must not be empty".to_string(),
                    ));
                }
                params.push(("city", name.to_string()));
                if let Some(country) = country.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                    params.push(("country", country.to_string()));
                }
            }
            WeatherQuery::Coordinates {
                latitude,
                longitude,
            } => {
                if !(-90.0..=90.0).contains(latitude) || !(-180.0..=180.0).contains(longitude) {
                    return Err(WeatherError::InvalidRequest(format!(
                        "Coordinates out of range: {}",
                        query.describe()
                    )));
                }
                params.push(("lat", latitude.to_string()));
                params.push(("lon", longitude.to_string()));
            }
        }
        params.push(("key", self.api_key.clone()));

        Url::parse_with_params(&endpoint, &params)
            .map_err(|e| WeatherError::InvalidRequest(format!("Invalid request URL: {}", e)))
    }

    /// Fetch current conditions for `query`.
    ///
    /// # Errors
    /// - [`WeatherError::LocationNotFound`] when the API knows no such place
    /// - [`WeatherError::InvalidApiKey`] on 401/403
    /// - [`WeatherError::Api`] for other unsuccessful statuses
    /// - [`WeatherError::Network`] / [`WeatherError::Parse`] for transport and body failures
    pub async fn fetch_current(&self, query: &WeatherQuery) -> Result<CurrentWeather, WeatherError> {
        let url = self.current_url(query)?;
        tracing::debug!("Fetching current weather for {}", query.describe());

        let response = with_retry(&self.retry, || self.client.get(url.clone()).send()).await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Err(WeatherError::LocationNotFound(query.describe()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            tracing::warn!("Weather API returned {}: {}", status, message);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => WeatherError::InvalidApiKey,
                StatusCode::BAD_REQUEST if matches!(query, WeatherQuery::City { .. }) => {
                    WeatherError::LocationNotFound(query.describe())
                }
                _ => WeatherError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(WeatherError::LocationNotFound(query.describe()));
        }

        let parsed: CurrentResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let observation = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(query.describe()))?;

        let current = CurrentWeather::from(observation);
        tracing::info!(
            "Fetched weather for {}, {}: {:.1}°C, {}",
            current.city_name,
            current.country_code,
            current.temperature,
            current.description
        );
        Ok(current)
    }
}
