//! Import command
//!
//! Usage: etlshell import <FILE> --source <CODE> [--module <NAME>]

use clap::Args;
use etlshell_core::{
    batch_upsert, default_currency, PassThroughSync, UpsertOutcome, UpsertSettings,
};
use etlshell_store::{SqliteImportLedger, SqliteStorage};
use std::path::{Path, PathBuf};

use super::{open_db, DEFAULT_MODULE};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file holding an array of rows
    pub file: PathBuf,

    /// Code of the system the rows come from
    #[arg(long)]
    pub source: String,

    /// Importing module recorded on each row
    #[arg(long, default_value = DEFAULT_MODULE)]
    pub module: String,
}

pub fn execute(db: &Path, args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let batch = std::fs::read_to_string(&args.file)?;
    let mut conn = open_db(db)?;

    let currency = default_currency(&SqliteStorage::new(&conn))?;
    let settings = UpsertSettings::new(args.module, currency);
    let hook = PassThroughSync::new(args.source);

    let mut ledger = SqliteImportLedger::new(&mut conn);
    match batch_upsert(&mut ledger, &hook, &settings, batch) {
        UpsertOutcome::Completed { inserted, skipped } => {
            println!("Imported {} row(s), skipped {}", inserted, skipped);
            Ok(())
        }
        UpsertOutcome::Aborted { error, inserted } => Err(format!(
            "{} ({} row(s) committed before the batch stopped)",
            error, inserted
        )
        .into()),
        UpsertOutcome::PartiallyFailed {
            failures,
            inserted,
            skipped,
        } => {
            for failure in &failures {
                eprintln!(
                    "row {} ({}): {}",
                    failure.index, failure.import_key, failure.message
                );
            }
            Err(format!(
                "{} row(s) failed to commit; imported {}, skipped {}",
                failures.len(),
                inserted,
                skipped
            )
            .into())
        }
    }
}
