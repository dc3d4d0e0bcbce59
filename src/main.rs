use clap::Parser;
use tracing_subscriber::EnvFilter;

use duckbind::cli::Args;
use duckbind::commands::CommandRunner;
use duckbind::config::ConfigFile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigFile::load(args.config.as_deref())?;
    let db = config.open()?;
    let output = args.command.run(&db, args.format)?;
    println!("{}", output);
    Ok(())
}
