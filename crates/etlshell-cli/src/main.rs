//! etl-shell CLI
//!
//! Command-line interface for importing, loading and inspecting ledger imports

use clap::{Parser, Subcommand};
use etlshell_core::logging_facility::{init, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "etlshell")]
#[command(about = "etl-shell - Idempotent ledger imports", long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(
        long,
        global = true,
        env = "ETLSHELL_DB",
        default_value = ".etlshell/store.db"
    )]
    db: PathBuf,

    /// Log profile (dev, prod, test)
    #[arg(long, global = true, env = "ETLSHELL_LOG", default_value = "prod")]
    log: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upsert a JSON batch of rows into the import ledger
    Import(commands::import::ImportArgs),
    /// Promote pending imported rows into the ledger
    Load(commands::load::LoadArgs),
    /// Check whether a row was already imported
    Exists(commands::exists::ExistsArgs),
    /// Read or write host configuration parameters
    Config(commands::config::ConfigArgs),
    /// Show the catalog name and imported row counts
    Info(commands::info::InfoArgs),
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init(cli.log);

    let result = match cli.command {
        Commands::Import(args) => commands::import::execute(&cli.db, args),
        Commands::Load(args) => commands::load::execute(&cli.db, args),
        Commands::Exists(args) => commands::exists::execute(&cli.db, args),
        Commands::Config(args) => commands::config::execute(&cli.db, args),
        Commands::Info(args) => commands::info::execute(&cli.db, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
