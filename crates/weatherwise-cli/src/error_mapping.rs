//! Conversions from service crate errors into the application error hierarchy.

use weatherwise_core::{AppError, NetworkError, ReqwestErrorExt, StorageError, WeatherError};
use weatherwise_settings::StorageError as PreferenceStorageError;
use weatherwise_weather::WeatherError as ProviderError;

/// Lift a service error into [`AppError`] for display and logging.
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for ProviderError {
    fn into_app_error(self) -> AppError {
        match self {
            ProviderError::Network(e) => AppError::Network(e.into_network_error()),
            ProviderError::LocationNotFound(s) => AppError::Weather(WeatherError::LocationNotFound(s)),
            ProviderError::InvalidApiKey => AppError::Weather(WeatherError::InvalidApiKey),
            ProviderError::Api { status, .. } if status >= 500 => {
                AppError::Weather(WeatherError::ServiceUnavailable)
            }
            ProviderError::Api { status, message } => {
                AppError::Weather(WeatherError::ApiError(format!("{}: {}", status, message)))
            }
            ProviderError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            ProviderError::InvalidRequest(s) => AppError::Weather(WeatherError::InvalidRequest(s)),
        }
    }
}

impl IntoAppError for PreferenceStorageError {
    fn into_app_error(self) -> AppError {
        let detail = self.to_string();
        match self {
            PreferenceStorageError::Read { .. } => AppError::Storage(StorageError::ReadFailed(detail)),
            PreferenceStorageError::Write { .. } => AppError::Storage(StorageError::WriteFailed(detail)),
        }
    }
}
