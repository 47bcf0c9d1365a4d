use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::theme::TimeOfDay;

/// Weather condition categories mapped from Weatherbit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Mist,
    Clear,
    Clouds,
    Unknown,
}

impl WeatherCondition {
    /// Convert a Weatherbit weather code to a WeatherCondition
    /// See: https://www.weatherbit.io/api/codes
    pub fn from_code(code: i32) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Mist,
            800 => Self::Clear,
            801..=i32::MAX => Self::Clouds,
            _ => Self::Unknown,
        }
    }

    /// Icon asset name, with day/night variants for clear and cloudy skies
    pub fn icon_name(&self, time_of_day: TimeOfDay) -> &'static str {
        match (self, time_of_day) {
            (Self::Thunderstorm, _) => "thunderstorm",
            (Self::Drizzle, _) => "drizzle",
            (Self::Rain, _) => "rain",
            (Self::Snow, _) => "snow",
            (Self::Mist, _) => "mist",
            (Self::Clear, TimeOfDay::Day) => "clear-day",
            (Self::Clear, TimeOfDay::Night) => "clear-night",
            (Self::Clouds, TimeOfDay::Day) => "clouds-day",
            (Self::Clouds, TimeOfDay::Night) => "clouds-night",
            (Self::Unknown, _) => "unknown",
        }
    }
}

/// What to look up: a city (optionally narrowed by country) or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City {
        name: String,
        country: Option<String>,
    },
    Coordinates {
        latitude: f64,
        longitude: f64,
    },
}

impl WeatherQuery {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City {
            name: name.into(),
            country: None,
        }
    }

    pub fn city_in(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self::City {
            name: name.into(),
            country: Some(country.into()),
        }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        Self::Coordinates {
            latitude,
            longitude,
        }
    }

    /// Short human-readable form for logs and error messages
    pub fn describe(&self) -> String {
        match self {
            Self::City {
                name,
                country: Some(country),
            } => format!("{}, {}", name, country),
            Self::City { name, country: None } => name.clone(),
            Self::Coordinates {
                latitude,
                longitude,
            } => format!("{:.4}, {:.4}", latitude, longitude),
        }
    }
}

/// Current conditions for one place. Temperatures are in Celsius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city_name: String,
    pub country_code: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    /// Relative humidity, percent
    pub humidity: u8,
    /// Metres per second
    pub wind_speed: f64,
    /// Millibars
    pub pressure: f64,
    pub uv_index: f64,
    /// Kilometres
    pub visibility: f64,
    pub condition: WeatherCondition,
    pub condition_code: i32,
    pub description: String,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Weatherbit `/current` response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    #[serde(default)]
    pub data: Vec<Observation>,
}

/// Weatherbit error body, e.g. `{"error": "API key not valid"}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Observation {
    pub city_name: String,
    #[serde(default)]
    pub country_code: String,
    pub temp: f64,
    pub app_temp: Option<f64>,
    #[serde(default)]
    pub rh: f64,
    #[serde(default)]
    pub wind_spd: f64,
    #[serde(default)]
    pub pres: f64,
    #[serde(default)]
    pub uv: f64,
    #[serde(default)]
    pub vis: f64,
    pub weather: ObservationWeather,
    pub ob_time: Option<String>,
    pub ts: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObservationWeather {
    pub code: i32,
    #[serde(default)]
    pub description: String,
}

impl Observation {
    /// `ob_time` is "YYYY-MM-DD HH:MM" in UTC; `ts` is the fallback.
    fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.ob_time
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").ok())
            .map(|naive| naive.and_utc())
            .or_else(|| self.ts.and_then(|ts| Utc.timestamp_opt(ts, 0).single()))
    }
}

impl From<Observation> for CurrentWeather {
    fn from(obs: Observation) -> Self {
        let observed_at = obs.observed_at();
        Self {
            condition: WeatherCondition::from_code(obs.weather.code),
            condition_code: obs.weather.code,
            description: obs.weather.description,
            city_name: obs.city_name,
            country_code: obs.country_code,
            apparent_temperature: obs.app_temp.unwrap_or(obs.temp),
            temperature: obs.temp,
            humidity: obs.rh.round().clamp(0.0, 100.0) as u8,
            wind_speed: obs.wind_spd,
            pressure: obs.pres,
            uv_index: obs.uv,
            visibility: obs.vis,
            observed_at,
        }
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_thunderstorm() {
        assert_eq!(WeatherCondition::from_code(200), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_code(233), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn test_code_drizzle_rain_snow_mist() {
        assert_eq!(WeatherCondition::from_code(300), WeatherCondition::Drizzle);
        assert_eq!(WeatherCondition::from_code(502), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_code(522), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_code(610), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_code(741), WeatherCondition::Mist);
    }

    #[test]
    fn test_code_clear_and_clouds() {
        assert_eq!(WeatherCondition::from_code(800), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_code(801), WeatherCondition::Clouds);
        assert_eq!(WeatherCondition::from_code(804), WeatherCondition::Clouds);
        assert_eq!(WeatherCondition::from_code(900), WeatherCondition::Clouds);
    }

    #[test]
    fn test_code_gaps_are_unknown() {
        assert_eq!(WeatherCondition::from_code(400), WeatherCondition::Unknown);
        assert_eq!(WeatherCondition::from_code(199), WeatherCondition::Unknown);
        assert_eq!(WeatherCondition::from_code(-1), WeatherCondition::Unknown);
    }

    #[test]
    fn test_icon_day_night_variants() {
        assert_eq!(WeatherCondition::Clear.icon_name(TimeOfDay::Day), "clear-day");
        assert_eq!(WeatherCondition::Clear.icon_name(TimeOfDay::Night), "clear-night");
        assert_eq!(WeatherCondition::Clouds.icon_name(TimeOfDay::Night), "clouds-night");
        assert_eq!(WeatherCondition::Rain.icon_name(TimeOfDay::Night), "rain");
        assert_eq!(WeatherCondition::Unknown.icon_name(TimeOfDay::Day), "unknown");
    }

    #[test]
    fn test_query_describe() {
        assert_eq!(WeatherQuery::city_in("Valenzuela", "PH").describe(), "Valenzuela, PH");
        assert_eq!(WeatherQuery::city("Oslo").describe(), "Oslo");
        assert_eq!(
            WeatherQuery::coordinates(14.7, 120.98).describe(),
            "14.7000, 120.9800"
        );
    }

    #[test]
    fn test_observation_conversion() {
        let json = serde_json::json!({
            "city_name": "Valenzuela",
            "country_code": "PH",
            "temp": 31.4,
            "app_temp": 37.9,
            "rh": 66.6,
            "wind_spd": 3.14,
            "pres": 1007.5,
            "uv": 8.25,
            "vis": 16,
            "weather": { "code": 803, "description": "Broken clouds", "icon": "c03d" },
            "ob_time": "2026-10-16 04:30",
            "ts": 1792125000
        });
        let obs: Observation = serde_json::from_value(json).unwrap();
        let current = CurrentWeather::from(obs);

        assert_eq!(current.city_name, "Valenzuela");
        assert_eq!(current.country_code, "PH");
        assert_eq!(current.temperature, 31.4);
        assert_eq!(current.apparent_temperature, 37.9);
        assert_eq!(current.humidity, 67);
        assert_eq!(current.visibility, 16.0);
        assert_eq!(current.condition, WeatherCondition::Clouds);
        assert_eq!(current.description, "Broken clouds");
        assert_eq!(
            current.observed_at.map(|t| t.to_rfc3339()),
            Some("2026-10-16T04:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_observation_fallbacks() {
        let json = serde_json::json!({
            "city_name": "Nowhere",
            "temp": -3.0,
            "weather": { "code": 601 },
            "ts": 0
        });
        let obs: Observation = serde_json::from_value(json).unwrap();
        let current = CurrentWeather::from(obs);

        assert_eq!(current.apparent_temperature, -3.0);
        assert_eq!(current.humidity, 0);
        assert_eq!(current.country_code, "");
        assert_eq!(current.condition, WeatherCondition::Snow);
        assert_eq!(current.observed_at, Utc.timestamp_opt(0, 0).single());
    }
}
