//! Config command
//!
//! Usage: etlshell config get <KEY> | etlshell config set <KEY> <VALUE>

use clap::{Args, Subcommand};
use etlshell_core::StoragePort;
use etlshell_store::storage::set_config_param;
use etlshell_store::SqliteStorage;
use std::path::Path;

use super::open_db;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print a parameter's value
    Get { key: String },
    /// Set a parameter
    Set { key: String, value: String },
}

pub fn execute(db: &Path, args: ConfigArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db)?;

    match args.command {
        ConfigCommand::Get { key } => match SqliteStorage::new(&conn).config_param(&key)? {
            Some(value) => {
                println!("{}", value);
                Ok(())
            }
            None => Err(format!("Config parameter not set: {}", key).into()),
        },
        ConfigCommand::Set { key, value } => {
            set_config_param(&conn, &key, &value)?;
            println!("{} = {}", key, value);
            Ok(())
        }
    }
}
