//! Info command
//!
//! Usage: etlshell info [--json]

use clap::Args;
use etlshell_core::StoragePort;
use etlshell_store::{ImportLedgerRepo, SqliteStorage};
use std::path::Path;

use super::open_db;

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Print a JSON document instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn execute(db: &Path, args: InfoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db)?;
    let catalog = SqliteStorage::new(&conn).catalog_name()?;
    let counts = ImportLedgerRepo::counts_by_source(&conn)?;

    if args.json {
        let sources: Vec<_> = counts
            .iter()
            .map(|c| {
                serde_json::json!({
                    "source": c.source,
                    "total": c.total,
                    "pending": c.pending,
                })
            })
            .collect();
        let doc = serde_json::json!({ "catalog": catalog, "sources": sources });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("catalog: {}", catalog);
    for c in &counts {
        println!("{}\t{} imported\t{} pending", c.source, c.total, c.pending);
    }
    Ok(())
}
