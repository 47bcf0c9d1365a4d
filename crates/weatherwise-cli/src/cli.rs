//! Command-line interface definition using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// WeatherWise - current weather in your terminal
#[derive(Parser, Debug)]
#[command(name = "weatherwise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, env = "WEATHERWISE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Current weather for the default city
    Home {
        /// Keep refreshing until Ctrl-C (type `t` + Enter to toggle the unit, `r` to refresh)
        #[arg(short, long)]
        follow: bool,
    },

    /// Look up current weather for a city
    Search {
        /// City name, e.g. `San Jose`
        city: Vec<String>,
    },

    /// Show or change the temperature unit
    Settings {
        /// New unit, or `toggle` to flip the current one
        unit: Option<UnitChoice>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Home { follow: false }
    }
}

/// Unit change requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitChoice {
    Celsius,
    Fahrenheit,
    Toggle,
}

impl Cli {
    /// Default tracing filter for the chosen verbosity; `RUST_LOG` still wins.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["weatherwise"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.command.unwrap_or_default(), Commands::Home { follow: false });
    }

    #[test]
    fn test_cli_parse_home_follow() {
        let cli = Cli::parse_from(["weatherwise", "home", "--follow"]);
        assert_eq!(cli.command, Some(Commands::Home { follow: true }));
    }

    #[test]
    fn test_cli_parse_search_multi_word() {
        let cli = Cli::parse_from(["weatherwise", "search", "San", "Jose"]);
        match cli.command {
            Some(Commands::Search { city }) => assert_eq!(city.join(" "), "San Jose"),
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_parse_search_without_city() {
        let cli = Cli::parse_from(["weatherwise", "search"]);
        assert_eq!(cli.command, Some(Commands::Search { city: vec![] }));
    }

    #[test]
    fn test_cli_parse_settings() {
        let cli = Cli::parse_from(["weatherwise", "settings", "fahrenheit"]);
        assert_eq!(
            cli.command,
            Some(Commands::Settings {
                unit: Some(UnitChoice::Fahrenheit)
            })
        );

        let cli = Cli::parse_from(["weatherwise", "settings"]);
        assert_eq!(cli.command, Some(Commands::Settings { unit: None }));
    }

    #[test]
    fn test_cli_rejects_unknown_unit() {
        assert!(Cli::try_parse_from(["weatherwise", "settings", "kelvin"]).is_err());
    }

    #[test]
    fn test_cli_verbose() {
        let cli = Cli::parse_from(["weatherwise", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_level(), "trace");
        assert_eq!(Cli::parse_from(["weatherwise"]).log_level(), "info");
    }

    #[test]
    fn test_cli_config_path() {
        let cli = Cli::parse_from(["weatherwise", "--config", "/tmp/ww.toml", "home"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ww.toml")));
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}
