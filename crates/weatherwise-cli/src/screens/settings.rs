//! Settings screen: temperature unit picker and the About card.

use std::io::{self, Write};

use weatherwise_settings::TemperatureUnit;
use weatherwise_weather::TimeOfDay;

use crate::app_services::AppServices;
use crate::cli::UnitChoice;
use crate::error_mapping::IntoAppError;
use crate::render::Palette;

const VERSION: &str = env!("CARGO_PKG_VERSION");

impl UnitChoice {
    /// The unit to save, given what is current now.
    pub fn resolve(self, current: TemperatureUnit) -> TemperatureUnit {
        match self {
            UnitChoice::Celsius => TemperatureUnit::Celsius,
            UnitChoice::Fahrenheit => TemperatureUnit::Fahrenheit,
            UnitChoice::Toggle => current.toggled(),
        }
    }
}

fn unit_row(out: &mut impl Write, unit: TemperatureUnit, current: TemperatureUnit) -> io::Result<()> {
    let mark = if unit == current { "x" } else { " " };
    let label = match unit {
        TemperatureUnit::Celsius => "Celsius",
        TemperatureUnit::Fahrenheit => "Fahrenheit",
    };
    writeln!(out, "  [{}] {} (°{})", mark, label, unit.symbol())
}

/// Draw the settings screen with `current` selected.
///
/// # Errors
/// Propagates write failures from `out`.
pub fn render(out: &mut impl Write, current: TemperatureUnit, palette: Palette) -> io::Result<()> {
    let time_of_day = TimeOfDay::now();

    writeln!(out, "{}", palette.accent("Settings", time_of_day))?;
    writeln!(out)?;
    writeln!(out, "Temperature Units")?;
    writeln!(out, "  Display temperature as (Celsius or Fahrenheit for all readings)")?;
    unit_row(out, TemperatureUnit::Celsius, current)?;
    unit_row(out, TemperatureUnit::Fahrenheit, current)?;
    writeln!(out)?;
    writeln!(out, "About")?;
    writeln!(out, "  {}", palette.accent("WeatherWise", time_of_day))?;
    writeln!(out, "  Version {}", VERSION)?;
    writeln!(out, "  Weather data provided by: Weatherbit.io")?;
    Ok(())
}

/// Apply `choice` if given, then show the screen.
///
/// A failed save leaves the unit unchanged and prints a notice above the
/// screen.
///
/// # Errors
/// Fails only when writing to `out` fails.
pub async fn run<W: Write>(
    services: &AppServices,
    choice: Option<UnitChoice>,
    palette: Palette,
    out: &mut W,
) -> anyhow::Result<()> {
    let preferences = services.preferences();
    preferences.wait_loaded().await;

    if let Some(choice) = choice {
        let unit = choice.resolve(preferences.unit());
        if let Err(e) = preferences.try_set_unit(unit).await {
            let err = e.into_app_error();
            tracing::error!("Failed to save temperature unit: {}", err);
            writeln!(out, "{}", err.user_message())?;
            writeln!(out)?;
        }
    }

    render(out, preferences.unit(), palette)?;
    out.flush()?;
    Ok(())
}
