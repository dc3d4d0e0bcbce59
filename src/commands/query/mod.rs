mod execute;
mod output;
mod output_tests;

use clap::Args;

/// Prepare and run a statement, printing its rows
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  duckbind query 'SELECT * FROM range(10)'
  duckbind query 'SELECT ?::HUGEINT AS h' -p 170141183460469231731687303715884105727
  duckbind query 'SELECT * FROM large_table' --pending --limit 5")]
pub struct QueryCmd {
    /// Statement to run
    pub sql: String,

    /// Positional parameter values, bound in order (null, true/false,
    /// integers, decimals, YYYY-MM-DD dates, otherwise strings)
    #[arg(short, long = "param", allow_hyphen_values = true)]
    pub params: Vec<String>,

    /// Drive execution task by task instead of in one call
    #[arg(long, default_value_t = false)]
    pub pending: bool,

    /// Maximum number of rows to print (1-10000)
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=10000))]
    pub limit: u32,
}
