//! SQLite import ledger
//!
//! Each accepted row is written in its own transaction so that one row's
//! failure never takes other rows with it.

#![allow(clippy::result_large_err)]

use chrono::NaiveDate;
use etlshell_core::model::{ImportedRow, NaturalKey, NewImportedRow};
use etlshell_core::{ImportLedgerStore, InsertOutcome, StoragePort};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use crate::errors::{from_rusqlite, is_unique_violation, Result};
use crate::storage::SqliteStorage;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "id, sync_module, source, import_key, account_import_key, name, ref, \
     date, unit_amount, price_unit, amount, currency, import_user, analytic_account_id, \
     product_id, metadata, log, must_force, data_mapping_id, processed";

/// `ImportLedgerStore` over the `import_ledger` table
pub struct SqliteImportLedger<'c> {
    conn: &'c mut Connection,
}

impl<'c> SqliteImportLedger<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }
}

impl ImportLedgerStore for SqliteImportLedger<'_> {
    fn row_exists(&self, key: &NaturalKey) -> Result<bool> {
        SqliteStorage::new(&*self.conn)
            .exists(
                "import_ledger",
                "sync_module = ?1 AND source = ?2 AND import_key = ?3",
                &[
                    Value::from(key.sync_module.as_str()),
                    Value::from(key.source.as_str()),
                    Value::from(key.import_key.as_str()),
                ],
            )
            .map_err(|e| e.with_op("row_exists").with_entity_id(key.to_string()))
    }

    fn insert_row(&mut self, row: &NewImportedRow) -> Result<InsertOutcome> {
        let insert_error = |e: rusqlite::Error| {
            from_rusqlite(e)
                .with_op("insert_row")
                .with_entity_id(row.import_key.clone())
        };

        let tx = self.conn.transaction().map_err(insert_error)?;

        let inserted = tx.execute(
            "INSERT INTO import_ledger (
                sync_module, source, import_key, account_import_key, name, ref, date,
                unit_amount, price_unit, amount, currency, import_user, analytic_account_id,
                product_id, metadata, log, must_force, data_mapping_id, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            rusqlite::params![
                row.sync_module,
                row.source,
                row.import_key,
                row.account_import_key,
                row.name,
                row.reference,
                row.date.format(DATE_FORMAT).to_string(),
                row.unit_amount,
                row.price_unit,
                row.amount,
                row.currency,
                row.import_user,
                row.analytic_account_id,
                row.product_id,
                row.metadata,
                row.log,
                row.must_force,
                row.data_mapping_id,
                chrono::Utc::now().timestamp(),
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(key = %row.natural_key(), "natural key conflict at insert");
                return Ok(InsertOutcome::Duplicate);
            }
            Err(e) => return Err(insert_error(e)),
        }

        let id = tx.last_insert_rowid();
        tx.commit().map_err(insert_error)?;

        Ok(InsertOutcome::Inserted(id))
    }
}

/// Read queries over imported rows
pub struct ImportLedgerRepo;

impl ImportLedgerRepo {
    pub fn get(conn: &Connection, row_id: i64) -> Result<Option<ImportedRow>> {
        conn.query_row(
            &format!("SELECT {} FROM import_ledger WHERE id = ?1", SELECT_COLUMNS),
            [row_id],
            map_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn find(conn: &Connection, key: &NaturalKey) -> Result<Option<ImportedRow>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM import_ledger \
                 WHERE sync_module = ?1 AND source = ?2 AND import_key = ?3",
                SELECT_COLUMNS
            ),
            [&key.sync_module, &key.source, &key.import_key],
            map_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Rows not yet loaded, oldest first, optionally for one source only
    pub fn list_pending(conn: &Connection, source: Option<&str>) -> Result<Vec<ImportedRow>> {
        let sql = format!(
            "SELECT {} FROM import_ledger \
             WHERE processed IS NULL AND (?1 IS NULL OR source = ?1) ORDER BY id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([source], map_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// Number of imported rows per source, with how many are still pending
    pub fn counts_by_source(conn: &Connection) -> Result<Vec<SourceCount>> {
        let mut stmt = conn
            .prepare(
                "SELECT source, COUNT(*), SUM(CASE WHEN processed IS NULL THEN 1 ELSE 0 END)
                 FROM import_ledger GROUP BY source ORDER BY source",
            )
            .map_err(from_rusqlite)?;
        let counts = stmt
            .query_map([], |row| {
                Ok(SourceCount {
                    source: row.get(0)?,
                    total: row.get(1)?,
                    pending: row.get(2)?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(counts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCount {
    pub source: String,
    pub total: i64,
    pub pending: i64,
}

fn parse_date(idx: usize, text: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImportedRow> {
    let date: String = row.get(7)?;
    let processed: Option<String> = row.get(19)?;

    Ok(ImportedRow {
        id: row.get(0)?,
        data: NewImportedRow {
            sync_module: row.get(1)?,
            source: row.get(2)?,
            import_key: row.get(3)?,
            account_import_key: row.get(4)?,
            name: row.get(5)?,
            reference: row.get(6)?,
            date: parse_date(7, &date)?,
            unit_amount: row.get(8)?,
            price_unit: row.get(9)?,
            amount: row.get(10)?,
            currency: row.get(11)?,
            import_user: row.get(12)?,
            analytic_account_id: row.get(13)?,
            product_id: row.get(14)?,
            metadata: row.get(15)?,
            log: row.get(16)?,
            must_force: row.get(17)?,
            data_mapping_id: row.get(18)?,
        },
        processed: processed.map(|p| parse_date(19, &p)).transpose()?,
    })
}
