//! Plain-text rendering shared by the screens.

use std::io::{self, Write};

use chrono::{DateTime, Local};
use crossterm::style::{style, Color, Stylize};
use crossterm::tty::IsTty;
use weatherwise_settings::TemperatureUnit;
use weatherwise_weather::{CurrentWeather, TimeOfDay};

/// Status line shown while no weather data is available.
pub const LOADING: &str = "Loading weather data...";

/// Header accent coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    /// Style only when stdout is a terminal. crossterm drops the colors
    /// itself when `NO_COLOR` is set.
    pub fn detect() -> Self {
        Self {
            color: io::stdout().is_tty(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Bold `text` in the first color of the time-of-day gradient.
    pub fn accent(&self, text: &str, time_of_day: TimeOfDay) -> String {
        match time_of_day.gradient().start_rgb() {
            Some((r, g, b)) if self.color => {
                style(text).with(Color::Rgb { r, g, b }).bold().to_string()
            }
            _ => text.to_string(),
        }
    }
}

/// Which rows the detail card shows.
#[derive(Debug, Clone, Copy)]
pub struct CardLayout {
    pub pressure: bool,
}

/// Round half up, so -2.5 shows as -2 and -0.4 as 0.
pub fn round_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Converted, rounded temperature with its unit, e.g. `31°C`.
pub fn temperature(value_celsius: f64, unit: TemperatureUnit) -> String {
    format!(
        "{}°{}",
        round_display(unit.from_celsius(value_celsius)),
        unit.symbol()
    )
}

/// `Friday, October 16`
pub fn long_date(at: &DateTime<Local>) -> String {
    at.format("%A, %B %-d").to_string()
}

/// `02:05 PM`
pub fn clock_time(at: &DateTime<Local>) -> String {
    at.format("%I:%M %p").to_string()
}

/// Icon, temperature, description and the detail rows for one observation.
///
/// # Errors
/// Propagates write failures from `out`.
pub fn weather_card(
    out: &mut impl Write,
    weather: &CurrentWeather,
    unit: TemperatureUnit,
    time_of_day: TimeOfDay,
    layout: CardLayout,
) -> io::Result<()> {
    writeln!(out, "  {}", weather.condition.icon_name(time_of_day))?;
    writeln!(out, "  {}", temperature(weather.temperature, unit))?;
    writeln!(out, "  {}", weather.description)?;
    writeln!(out)?;
    writeln!(out, "  {:<12}{}%", "Humidity", weather.humidity)?;
    writeln!(out, "  {:<12}{:.1} m/s", "Wind", weather.wind_speed)?;
    if layout.pressure {
        writeln!(out, "  {:<12}{:.0} mb", "Pressure", weather.pressure)?;
    }
    writeln!(
        out,
        "  {:<12}{}",
        "Feels like",
        temperature(weather.apparent_temperature, unit)
    )?;
    writeln!(out, "  {:<12}{:.1}", "UV index", weather.uv_index)?;
    writeln!(out, "  {:<12}{} km", "Visibility", weather.visibility)?;
    Ok(())
}
