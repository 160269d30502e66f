//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::query::Query;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides configuration)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Dataset file to serve (overrides configuration)
    #[arg(short, long, value_name = "PATH")]
    pub dataset: Option<PathBuf>,
}

/// Where a search is answered.
#[derive(Debug, Clone, Args)]
pub struct RemoteArgs {
    /// Base address of the lookup API
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Search the configured dataset directly instead of the API
    #[arg(long, conflicts_with = "api_base")]
    pub offline: bool,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Callsign to match (exact, case-insensitive)
    #[arg(short, long)]
    pub callsign: Option<String>,

    /// Tail number to match (exact, case-insensitive)
    #[arg(short, long)]
    pub tail: Option<String>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

impl SearchCommand {
    /// The normalized query.
    #[must_use]
    pub fn query(&self) -> Query {
        Query::from_optional(self.callsign.as_deref(), self.tail.as_deref())
    }
}

/// Detail command arguments.
#[derive(Debug, Args)]
pub struct DetailCommand {
    /// Callsign of the selected aircraft
    #[arg(short, long)]
    pub callsign: Option<String>,

    /// Tail number of the selected aircraft
    #[arg(short, long)]
    pub tail: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

impl DetailCommand {
    /// The normalized query.
    #[must_use]
    pub fn query(&self) -> Query {
        Query::from_optional(self.callsign.as_deref(), self.tail.as_deref())
    }
}

/// Meta command arguments.
#[derive(Debug, Args)]
pub struct MetaCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

/// Log line format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormatArg {
    /// Human readable
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::logging::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_arg_conversion() {
        assert_eq!(
            crate::logging::LogFormat::from(LogFormatArg::Text),
            crate::logging::LogFormat::Text
        );
        assert_eq!(
            crate::logging::LogFormat::from(LogFormatArg::Json),
            crate::logging::LogFormat::Json
        );
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_search_command_query_normalizes() {
        let cmd = SearchCommand {
            callsign: Some(" dal123 ".to_string()),
            tail: Some(String::new()),
            limit: None,
            format: OutputFormat::Table,
            remote: RemoteArgs {
                api_base: None,
                offline: true,
            },
        };
        let query = cmd.query();
        assert_eq!(query.callsign.as_deref(), Some("dal123"));
        assert!(query.tail.is_none());
    }

    #[test]
    fn test_detail_command_query() {
        let cmd = DetailCommand {
            callsign: None,
            tail: Some("N2BB".to_string()),
            format: OutputFormat::Plain,
            remote: RemoteArgs {
                api_base: Some("http://localhost:8000".to_string()),
                offline: false,
            },
        };
        assert_eq!(cmd.query(), Query::normalize("", "N2BB"));
    }
}
