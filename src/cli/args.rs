//! Argument definitions for the `tickwatch` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tickwatch - futures market move alerts.
#[derive(Parser, Debug)]
#[command(name = "tickwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override the log level (e.g. `debug`, `tickwatch=trace`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the alert loop (default)
    Run(RunArgs),

    /// Validate the configuration file and exit
    Check,
}

/// Arguments for `tickwatch run`.
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,

    /// Log alerts instead of sending them to Telegram.
    #[arg(long)]
    pub no_telegram: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_run_with_config_toml() {
        let cli = Cli::parse_from(["tickwatch"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_run_flags_and_global_config() {
        let cli = Cli::parse_from([
            "tickwatch",
            "run",
            "--config",
            "/etc/tickwatch.toml",
            "--json-logs",
            "--no-telegram",
        ]);
        assert_eq!(cli.config, PathBuf::from("/etc/tickwatch.toml"));
        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.json_logs);
                assert!(args.no_telegram);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_check() {
        let cli = Cli::parse_from(["tickwatch", "check", "-c", "x.toml"]);
        assert!(matches!(cli.command, Some(Commands::Check)));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }
}
