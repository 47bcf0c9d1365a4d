//! Weather service for WeatherWise
//!
//! Fetches current conditions from the Weatherbit API and maps them to
//! display-ready types with time-of-day theming.

pub mod provider;
pub mod retry;
pub mod theme;
pub mod types;

pub use provider::{WeatherProvider, DEFAULT_BASE_URL};
pub use retry::RetryConfig;
pub use theme::{Gradient, TimeOfDay};
pub use types::*;
