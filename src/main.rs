// Rentalgen CLI binary

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use rentalgen::config::Config;
use rentalgen::constants::DEFAULT_CONFIG_FILE;
use rentalgen::db;
use rentalgen::error::SimError;
use rentalgen::sim::{connect_with_retry, Kernel};

#[derive(Parser)]
#[command(name = "rentalgen")]
#[command(about = "Generate a synthetic multi-year DVD-rental database", long_about = None)]
#[command(version)]
struct Cli {
    /// Database name (overrides the config file)
    database: Option<String>,

    /// Database name, flag form
    #[arg(long = "database", conflicts_with = "database")]
    database_flag: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed seasonal boost percent; replaces the monthly table. 0 disables
    /// seasonality, negatives allowed.
    #[arg(long, allow_hyphen_values = true)]
    season: Option<i32>,

    /// Simulated weeks (overrides the config file)
    #[arg(long)]
    weeks: Option<u32>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), SimError> {
    // Resolve configuration: explicit file, default file if present, else
    // built-in defaults.
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Config::load(&default_path)?
            } else {
                Config::default()
            }
        }
    };

    let database = cli.database.or(cli.database_flag);
    config.apply_overrides(database, cli.season, cli.weeks);
    config.validate()?;

    let db_path = db::database_path(&config.database.dir, &config.database.name);
    log::info!("Using database {}", db_path.display());

    let conn = connect_with_retry(&db_path)?;
    let mut kernel = Kernel::new(config, conn)?;

    // Finish and commit the in-flight week before exiting on Ctrl-C.
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
        eprintln!("Interrupt received; finishing current week...");
    }) {
        log::warn!("Could not install interrupt handler: {}", e);
    }
    kernel.set_cancel_flag(cancel);

    kernel.run()?;
    Ok(())
}
