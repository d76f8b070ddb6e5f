//! SQLite implementation of the storage port
//!
//! Query parameters and results travel as JSON values: booleans bind as
//! integers, arrays and objects bind as their JSON text, blobs come back as
//! hex strings.

#![allow(clippy::result_large_err)]

use std::path::Path;

use etlshell_core::errors::{ExError, ExErrorKind};
use etlshell_core::{Row, StoragePort};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde_json::{Number, Value};

use crate::errors::{from_rusqlite, Result};

/// Storage port over a borrowed connection
pub struct SqliteStorage<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStorage<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn query(&self, op: &str, sql: &str, params: &[Value], limit: Option<usize>) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| query_error(op, e))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sql_value)))
            .map_err(|e| query_error(op, e))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| query_error(op, e))? {
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                let value = row.get_ref(idx).map_err(|e| query_error(op, e))?;
                record.insert(name.clone(), from_sql_value(value));
            }
            out.push(record);
            if limit.is_some_and(|n| out.len() >= n) {
                break;
            }
        }

        Ok(out)
    }
}

impl StoragePort for SqliteStorage<'_> {
    fn one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query("one", sql, params, Some(1))?.into_iter().next())
    }

    fn all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.query("all", sql, params, None)
    }

    fn exists(&self, table: &str, where_clause: &str, params: &[Value]) -> Result<bool> {
        validate_identifier(table)?;
        let predicate = if where_clause.trim().is_empty() {
            "1"
        } else {
            where_clause
        };
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {})",
            table, predicate
        );

        let found: i64 = self
            .conn
            .query_row(
                &sql,
                params_from_iter(params.iter().map(to_sql_value)),
                |row| row.get(0),
            )
            .map_err(|e| query_error("exists", e).with_entity_id(table))?;

        Ok(found != 0)
    }

    fn catalog_name(&self) -> Result<String> {
        let file: String = self
            .conn
            .query_row(
                "SELECT file FROM pragma_database_list WHERE name = 'main'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| query_error("catalog_name", e))?;

        if file.is_empty() {
            return Ok(":memory:".to_string());
        }
        let stem = Path::new(&file)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        Ok(stem.unwrap_or(file))
    }

    fn config_param(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM config_parameters WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| query_error("config_param", e).with_entity_id(key))
    }
}

/// Insert or replace a configuration parameter
pub fn set_config_param(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO config_parameters (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    )
    .map_err(|e| query_error("set_config_param", e).with_entity_id(key))?;
    Ok(())
}

/// Accept only plain SQL identifiers (`[A-Za-z_][A-Za-z0-9_]*`)
fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("exists")
            .with_entity_id(name)
            .with_message(format!("'{}' is not a valid table name", name)))
    }
}

fn query_error(op: &str, err: rusqlite::Error) -> ExError {
    from_rusqlite(err).with_op(op)
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    }
}
