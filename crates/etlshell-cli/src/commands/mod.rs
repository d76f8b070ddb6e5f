pub mod config;
pub mod exists;
pub mod import;
pub mod info;
pub mod load;

use rusqlite::Connection;
use std::path::Path;

/// Default module name recorded on rows imported from the command line
pub const DEFAULT_MODULE: &str = "etl_shell";

/// Open the database and bring its schema up to date
pub fn open_db(path: &Path) -> Result<Connection, Box<dyn std::error::Error>> {
    Ok(etlshell_store::db::open_store(path)?)
}
