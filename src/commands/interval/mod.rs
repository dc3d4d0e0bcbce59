mod execute;
mod execute_tests;
mod output;

use clap::{Args, Subcommand};

/// Parse or format ISO 8601 interval strings
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  duckbind interval parse P1Y2M3DT4H5M6.7S
  duckbind interval parse -- -P1DT1S
  duckbind interval format --months 14 --days 3 --micros 14706700000")]
pub struct IntervalCmd {
    #[command(subcommand)]
    pub action: IntervalAction,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum IntervalAction {
    /// Parse a duration and pass it through the engine as an INTERVAL
    Parse {
        /// ISO 8601 duration, e.g. P1Y2M3DT4H5M6.7S
        #[arg(allow_hyphen_values = true)]
        input: String,
    },

    /// Render a (months, days, micros) triple as a duration
    Format {
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        months: i32,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        days: i32,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        micros: i64,
    },
}
