//! Load command
//!
//! Usage: etlshell load [--source <CODE>] [--user <ID>]

use clap::Args;
use etlshell_core::LoadContext;
use std::path::Path;

use super::open_db;

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Only load rows imported from this source
    #[arg(long)]
    pub source: Option<String>,

    /// User the ledger lines are booked for
    #[arg(long, default_value_t = 1)]
    pub user: i64,
}

pub fn execute(db: &Path, args: LoadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open_db(db)?;
    let ctx = LoadContext::new(args.user, chrono::Local::now().date_naive());

    let loaded = etlshell_store::load_pending(&mut conn, args.source.as_deref(), &ctx)?;
    println!("Loaded {} row(s)", loaded.len());
    Ok(())
}
