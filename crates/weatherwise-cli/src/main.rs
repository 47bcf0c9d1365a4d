//! WeatherWise CLI entry point.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use weatherwise_cli::cli::{Cli, Commands};
use weatherwise_cli::screens::{home, search, settings};
use weatherwise_cli::{AppServices, Palette};
use weatherwise_core::{AppError, Config};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = weatherwise_core::init(cli.log_level()) {
        eprintln!("Warning: {:#}", e);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(cli));

    // A pending stdin read in follow mode would otherwise hold shutdown open.
    runtime.shutdown_timeout(Duration::from_millis(250));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            match e.downcast_ref::<AppError>() {
                Some(app) => eprintln!("Error: {}", app.user_message()),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, _) = Config::load_validated(cli.config.as_deref()).map_err(AppError::from)?;
    let services = AppServices::from_config(config)?;

    let palette = Palette::detect();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or_default() {
        Commands::Home { follow } => home::run(&services, follow, palette, &mut out).await,
        Commands::Search { city } => search::run(&services, &city.join(" "), palette, &mut out).await,
        Commands::Settings { unit } => settings::run(&services, unit, palette, &mut out).await,
    }
}
