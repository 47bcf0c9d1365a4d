//! Home screen: current conditions for the configured city.
//!
//! With `--follow` the screen stays up, refetching on the configured
//! interval and redrawing whenever the temperature unit changes. Lines on
//! stdin act as commands: `t` toggles the unit, `r` refreshes, `q` quits.

use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use chrono::{DateTime, Local, Timelike};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use weatherwise_settings::TemperatureUnit;
use weatherwise_weather::{CurrentWeather, TimeOfDay};

use crate::app_services::AppServices;
use crate::error_mapping::IntoAppError;
use crate::render::{self, CardLayout, Palette};

/// What the home screen is showing.
#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub weather: Option<CurrentWeather>,
    pub fetched_at: Option<DateTime<Local>>,
}

impl HomeState {
    /// Fetch the default city. A failed refresh keeps the previous reading.
    pub async fn refresh(&mut self, services: &AppServices) {
        let query = services.default_query();
        match services.weather().fetch_current(&query).await {
            Ok(weather) => {
                self.weather = Some(weather);
                self.fetched_at = Some(Local::now());
            }
            Err(e) => {
                let err = e.into_app_error();
                tracing::error!(
                    "Error fetching weather for {}: {} ({})",
                    query.describe(),
                    err,
                    err.user_message()
                );
            }
        }
    }

    /// Observation time if the API reported one, else when we fetched.
    fn last_updated(&self) -> Option<DateTime<Local>> {
        self.weather
            .as_ref()
            .and_then(|w| w.observed_at)
            .map(|at| at.with_timezone(&Local))
            .or(self.fetched_at)
    }
}

/// Draw the screen for `state` as of `now`.
///
/// # Errors
/// Propagates write failures from `out`.
pub fn render(
    out: &mut impl Write,
    state: &HomeState,
    unit: TemperatureUnit,
    palette: Palette,
    now: &DateTime<Local>,
) -> io::Result<()> {
    let Some(weather) = &state.weather else {
        return writeln!(out, "{}", render::LOADING);
    };

    let time_of_day = TimeOfDay::from_hour(now.hour());
    writeln!(out, "{}", palette.accent(&weather.city_name, time_of_day))?;
    writeln!(out, "{}", render::long_date(now))?;
    writeln!(out)?;
    render::weather_card(out, weather, unit, time_of_day, CardLayout { pressure: true })?;

    if let Some(at) = state.last_updated() {
        writeln!(out)?;
        writeln!(out, "Last updated: {}", render::clock_time(&at))?;
    }
    Ok(())
}

fn draw(
    out: &mut impl Write,
    state: &HomeState,
    unit: TemperatureUnit,
    palette: Palette,
) -> io::Result<()> {
    render(out, state, unit, palette, &Local::now())?;
    out.flush()
}

/// Show the home screen once, or keep it live with `follow`.
///
/// # Errors
/// Fails only when writing to `out` fails; fetch errors are logged and the
/// screen keeps its loading status or last reading.
pub async fn run<W: Write>(
    services: &AppServices,
    follow: bool,
    palette: Palette,
    out: &mut W,
) -> anyhow::Result<()> {
    let preferences = services.preferences();
    preferences.wait_loaded().await;

    let mut state = HomeState::default();
    state.refresh(services).await;
    draw(out, &state, preferences.unit(), palette)?;

    if follow {
        let commands = BufReader::new(tokio::io::stdin());
        let interrupted = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Interrupted, leaving home screen");
        };
        self::follow(
            services,
            state,
            services.refresh_interval(),
            commands,
            interrupted,
            palette,
            out,
        )
        .await?;
    }
    Ok(())
}

/// Keep the screen live, starting from an already drawn `state`.
///
/// Refetches every `refresh` (never when `None`), redraws when the unit
/// changes, and reads one command per line from `commands`. Returns on `q`
/// or once `shutdown` completes. A closed `commands` stream is not an exit.
///
/// # Errors
/// Fails only when writing to `out` fails.
pub async fn follow<W, R, S>(
    services: &AppServices,
    mut state: HomeState,
    refresh: Option<Duration>,
    commands: R,
    shutdown: S,
    palette: Palette,
    out: &mut W,
) -> anyhow::Result<()>
where
    W: Write,
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let preferences = services.preferences();
    let mut units = preferences.subscribe();
    let mut ticker = refresh.map(|period| {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });
    let mut commands = commands.lines();
    let mut commands_open = true;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = next_tick(&mut ticker) => {
                tracing::debug!("Scheduled weather refresh");
                state.refresh(services).await;
                draw(out, &state, preferences.unit(), palette)?;
            }
            changed = units.changed() => {
                if changed.is_err() {
                    break;
                }
                let unit = *units.borrow_and_update();
                draw(out, &state, unit, palette)?;
            }
            line = commands.next_line(), if commands_open => match line {
                Ok(Some(line)) => match line.trim() {
                    "t" => preferences.toggle().await,
                    "r" => {
                        state.refresh(services).await;
                        draw(out, &state, preferences.unit(), palette)?;
                    }
                    "q" => break,
                    "" => {}
                    other => tracing::debug!("Ignoring unknown command: {}", other),
                },
                Ok(None) => commands_open = false,
                Err(e) => {
                    tracing::warn!("Stopped reading commands: {}", e);
                    commands_open = false;
                }
            },
            _ = &mut shutdown => break,
        }
    }
    Ok(())
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
