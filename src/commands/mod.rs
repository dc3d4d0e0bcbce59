//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - `execute.rs` producing a serializable result
//! - `output.rs` rendering that result as a table

mod interval;
mod query;
mod wide;

pub use interval::{IntervalAction, IntervalCmd};
pub use query::QueryCmd;
pub use wide::WideCmd;

use clap::Subcommand;
use enum_dispatch::enum_dispatch;
use std::error::Error;

use crate::connection::Database;
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, db: &Database) -> Result<Self::Output, Box<dyn Error>>;
}

/// Run a command and render its result in the requested format.
#[enum_dispatch]
pub trait CommandRunner {
    fn run(self, db: &Database, format: OutputFormat) -> Result<String, Box<dyn Error>>;
}

#[enum_dispatch(CommandRunner)]
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prepare and run a statement, printing its rows
    Query(QueryCmd),

    /// Parse or format ISO 8601 interval strings
    Interval(IntervalCmd),

    /// Show how an integer splits into HUGEINT words
    Wide(WideCmd),
}

impl CommandRunner for QueryCmd {
    fn run(self, db: &Database, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        Ok(self.execute(db)?.format(format))
    }
}

impl CommandRunner for IntervalCmd {
    fn run(self, db: &Database, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        Ok(self.execute(db)?.format(format))
    }
}

impl CommandRunner for WideCmd {
    fn run(self, db: &Database, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        Ok(self.execute(db)?.format(format))
    }
}
