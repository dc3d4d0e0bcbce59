//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file
    ///
    /// If not specified, searches for configuration in:
    ///   1. ./.duckbind.json (current directory)
    ///   2. ~/.duckbind.json (user-global)
    ///
    /// and falls back to an empty in-memory database.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Default `tracing` filter directive when RUST_LOG is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "duckbind=debug,engine=debug" } else { "warn" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_global_flags_default() {
        let args = Args::try_parse_from(["duckbind", "wide", "1"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.format, OutputFormat::Table);
        assert!(!args.verbose);
        assert_eq!(args.log_filter(), "warn");
    }

    #[rstest]
    fn test_global_flags_before_subcommand() {
        let args = Args::try_parse_from([
            "duckbind", "-c", "conf.json", "-o", "toon", "-v", "wide", "1",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("conf.json")));
        assert_eq!(args.format, OutputFormat::Toon);
        assert_eq!(args.log_filter(), "duckbind=debug,engine=debug");
    }

    #[rstest]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["duckbind", "-o", "yaml", "wide", "1"]).is_err());
    }

    #[rstest]
    fn test_requires_subcommand() {
        assert!(Args::try_parse_from(["duckbind"]).is_err());
    }
}
