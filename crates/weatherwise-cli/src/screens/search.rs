//! Search screen: one-off lookup of any city. Always drawn with day theming.

use std::io::{self, Write};

use weatherwise_settings::TemperatureUnit;
use weatherwise_weather::{CurrentWeather, TimeOfDay, WeatherQuery};

use crate::app_services::AppServices;
use crate::error_mapping::IntoAppError;
use crate::render::{self, CardLayout, Palette};

pub const EMPTY_QUERY: &str = "Please enter a city name";
pub const SEARCH_FAILED: &str = "City not found or network error. Please try again.";

/// Draw the result card for `weather`.
///
/// # Errors
/// Propagates write failures from `out`.
pub fn render_result(
    out: &mut impl Write,
    weather: &CurrentWeather,
    unit: TemperatureUnit,
    palette: Palette,
) -> io::Result<()> {
    let header = format!("{}, {}", weather.city_name, weather.country_code);
    writeln!(out, "{}", palette.accent(&header, TimeOfDay::Day))?;
    writeln!(out)?;
    render::weather_card(out, weather, unit, TimeOfDay::Day, CardLayout { pressure: false })
}

/// Look up `city` and print the result or a short failure notice.
///
/// # Errors
/// Fails only when writing to `out` fails.
pub async fn run<W: Write>(
    services: &AppServices,
    city: &str,
    palette: Palette,
    out: &mut W,
) -> anyhow::Result<()> {
    let city = city.trim();
    if city.is_empty() {
        writeln!(out, "{}", EMPTY_QUERY)?;
        return Ok(());
    }

    let preferences = services.preferences();
    preferences.wait_loaded().await;

    match services.weather().fetch_current(&WeatherQuery::city(city)).await {
        Ok(weather) => render_result(out, &weather, preferences.unit(), palette)?,
        Err(e) => {
            let err = e.into_app_error();
            tracing::error!("Error searching for {}: {}", city, err);
            writeln!(out, "{}", SEARCH_FAILED)?;
        }
    }
    out.flush()?;
    Ok(())
}
