mod cli_tests;
mod execute;
mod output;

use clap::Args;

/// Show how an integer splits into HUGEINT words
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  duckbind wide -- -1
  duckbind wide 170141183460469231731687303715884105727
  duckbind wide 340282366920938463463374607431768211455 --unsigned")]
pub struct WideCmd {
    /// Decimal integer to split
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    /// Split as UHUGEINT instead of HUGEINT
    #[arg(short, long, default_value_t = false)]
    pub unsigned: bool,
}
