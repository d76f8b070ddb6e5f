//! Exists command
//!
//! Usage: etlshell exists --source <CODE> --import-key <KEY> [--module <NAME>]

use clap::Args;
use etlshell_core::model::NaturalKey;
use etlshell_core::ImportLedgerStore;
use etlshell_store::SqliteImportLedger;
use std::path::Path;

use super::{open_db, DEFAULT_MODULE};

#[derive(Debug, Args)]
pub struct ExistsArgs {
    #[arg(long)]
    pub source: String,

    #[arg(long)]
    pub import_key: String,

    #[arg(long, default_value = DEFAULT_MODULE)]
    pub module: String,
}

pub fn execute(db: &Path, args: ExistsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open_db(db)?;
    let key = NaturalKey::new(args.module, args.source, args.import_key);

    let found = SqliteImportLedger::new(&mut conn).row_exists(&key)?;
    println!("{}", found);
    Ok(())
}
