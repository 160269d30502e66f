//! Command-line interface for adsb-lookup.
//!
//! This module provides the CLI structure for the `adsb-lookup` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DetailCommand, LogFormatArg, MetaCommand, OutputFormat, RemoteArgs,
    SearchCommand, ServeCommand,
};

/// adsb-lookup - Find aircraft by callsign or tail number
///
/// Serves a small aircraft dataset over HTTP and queries it from the command
/// line.
#[derive(Debug, Parser)]
#[command(name = "adsb-lookup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, global = true, default_value = "text")]
    pub log_format: LogFormatArg,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the lookup API
    Serve(ServeCommand),

    /// Search aircraft by callsign and/or tail number
    Search(SearchCommand),

    /// Show the single record for a callsign/tail pair
    Detail(DetailCommand),

    /// Show dataset metadata
    Meta(MetaCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "adsb-lookup");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(
            parse(&["adsb-lookup", "-q", "meta"]).verbosity(),
            crate::logging::Verbosity::Quiet
        );
        assert_eq!(
            parse(&["adsb-lookup", "meta"]).verbosity(),
            crate::logging::Verbosity::Normal
        );
        assert_eq!(
            parse(&["adsb-lookup", "-v", "meta"]).verbosity(),
            crate::logging::Verbosity::Verbose
        );
        assert_eq!(
            parse(&["adsb-lookup", "-vv", "meta"]).verbosity(),
            crate::logging::Verbosity::Trace
        );
    }

    #[test]
    fn test_parse_serve() {
        let cli = parse(&["adsb-lookup", "serve", "--bind", "127.0.0.1:9000"]);
        match cli.command {
            Command::Serve(cmd) => assert_eq!(cmd.bind.as_deref(), Some("127.0.0.1:9000")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_search() {
        let cli = parse(&["adsb-lookup", "search", "--callsign", "dal123", "--limit", "5"]);
        match cli.command {
            Command::Search(cmd) => {
                assert_eq!(cmd.callsign.as_deref(), Some("dal123"));
                assert!(cmd.tail.is_none());
                assert_eq!(cmd.limit, Some(5));
                assert_eq!(cmd.format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_search_without_filters_is_allowed() {
        let cli = parse(&["adsb-lookup", "search"]);
        assert!(matches!(cli.command, Command::Search(_)));
    }

    #[test]
    fn test_offline_conflicts_with_api_base() {
        let result = Cli::try_parse_from([
            "adsb-lookup",
            "search",
            "--offline",
            "--api-base",
            "http://x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_detail() {
        let cli = parse(&["adsb-lookup", "detail", "--tail", "N2BB"]);
        match cli.command {
            Command::Detail(cmd) => assert_eq!(cmd.tail.as_deref(), Some("N2BB")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_config_and_log_format() {
        let cli = parse(&[
            "adsb-lookup",
            "-c",
            "/custom/config.toml",
            "--log-format",
            "json",
            "config",
            "show",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.log_format, LogFormatArg::Json);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: false })
        ));
    }
}
