//! XML rendering of query results
//!
//! A row becomes `<root>` with one child per column; each element carries a
//! `type` attribute (`str`, `int`, `float`, `bool`, `null`, `dict`, `list`).
//! A list of rows becomes `<root>` with one `<item type="dict">` per row.
//! Column names that are not valid XML names are written as
//! `<key name="...">`.

#![allow(clippy::result_large_err)]

use etlshell_core::{Row, StoragePort};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use crate::errors::{xml_error, Result};

const DECLARATION: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\" ?>";

/// Render one row; `None` when there is no row
pub fn row_to_xml(row: Option<&Row>) -> Result<Option<String>> {
    let Some(row) = row else {
        return Ok(None);
    };

    let mut writer = Writer::new(DECLARATION.to_vec());
    start(&mut writer, BytesStart::new("root"))?;
    write_fields(&mut writer, row)?;
    end(&mut writer, "root")?;
    finish(writer).map(Some)
}

/// Render several rows; `None` when the slice is empty
pub fn rows_to_xml(rows: &[Row]) -> Result<Option<String>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let mut writer = Writer::new(DECLARATION.to_vec());
    start(&mut writer, BytesStart::new("root"))?;
    for row in rows {
        start(
            &mut writer,
            BytesStart::new("item").with_attributes([("type", "dict")]),
        )?;
        write_fields(&mut writer, row)?;
        end(&mut writer, "item")?;
    }
    end(&mut writer, "root")?;
    finish(writer).map(Some)
}

/// Run a query through the port and render its first row
pub fn one_xml(port: &dyn StoragePort, sql: &str, params: &[Value]) -> Result<Option<String>> {
    let row = port.one(sql, params)?;
    row_to_xml(row.as_ref())
}

/// Run a query through the port and render every row
pub fn all_xml(port: &dyn StoragePort, sql: &str, params: &[Value]) -> Result<Option<String>> {
    let rows = port.all(sql, params)?;
    rows_to_xml(&rows)
}

fn write_fields(writer: &mut Writer<Vec<u8>>, row: &Row) -> Result<()> {
    for (key, value) in row {
        write_value(writer, key, value)?;
    }
    Ok(())
}

fn write_value(writer: &mut Writer<Vec<u8>>, key: &str, value: &Value) -> Result<()> {
    let tag = if is_xml_name(key) { key } else { "key" };
    let mut element = BytesStart::new(tag);
    if tag != key {
        element.push_attribute(("name", key));
    }
    element.push_attribute(("type", type_name(value)));
    start(writer, element)?;

    match value {
        Value::Null => {}
        Value::Bool(b) => text(writer, if *b { "true" } else { "false" })?,
        Value::Number(n) => text(writer, &n.to_string())?,
        Value::String(s) => text(writer, s)?,
        Value::Array(items) => {
            for item in items {
                write_value(writer, "item", item)?;
            }
        }
        Value::Object(map) => write_fields(writer, map)?,
    }

    end(writer, tag)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Letters, digits, `_`, `-` and `.`; starting with a letter or `_`, and
/// not starting with `xml` in any case
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    first_ok
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.to_ascii_lowercase().starts_with("xml")
}

fn start(writer: &mut Writer<Vec<u8>>, element: BytesStart<'_>) -> Result<()> {
    writer
        .write_event(Event::Start(element))
        .map_err(xml_error)
}

fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)
}

fn text(writer: &mut Writer<Vec<u8>>, content: &str) -> Result<()> {
    writer
        .write_event(Event::Text(BytesText::new(content)))
        .map_err(xml_error)
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(xml_error)
}
