use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::domain::row::RowMap;

/// Convert a sqlx `MySqlRow` into a `RowMap`, keeping the server's column
/// order and key casing.
///
/// `SHOW`/`DESCRIBE` result sets mix integers, strings, timestamps and
/// binary-collated text, so each column is decoded by trying the Rust types
/// sqlx accepts for it, most specific first.
pub fn row_to_map(row: &MySqlRow) -> Result<RowMap> {
    let mut map = RowMap::with_capacity(row.columns().len());
    for col in row.columns() {
        let value = decode_column(row, col.ordinal())?;
        map.insert(col.name().to_string(), value);
    }
    Ok(map)
}

fn decode_column(row: &MySqlRow, idx: usize) -> Result<Value> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }

    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Ok(json!(v));
    }
    if let Ok(v) = row.try_get::<u64, _>(idx) {
        return Ok(json!(v));
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return Ok(json!(v));
    }
    if let Ok(v) = row.try_get::<NaiveDateTime, _>(idx) {
        return Ok(json!(v.format("%Y-%m-%d %H:%M:%S").to_string()));
    }
    if let Ok(v) = row.try_get::<NaiveDate, _>(idx) {
        return Ok(json!(v.format("%Y-%m-%d").to_string()));
    }
    if let Ok(v) = row.try_get::<NaiveTime, _>(idx) {
        return Ok(json!(v.format("%H:%M:%S").to_string()));
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return Ok(Value::String(v));
    }

    // Binary-collated text (common in SHOW output) and anything sqlx has no
    // Rust mapping for: read the raw bytes.
    let bytes: Vec<u8> = row.try_get_unchecked(idx)?;
    match String::from_utf8(bytes) {
        Ok(s) => Ok(Value::String(s)),
        Err(e) => {
            let type_name = row.column(idx).type_info().name();
            tracing::debug!(column = idx, type_name, "non UTF-8 column decoded lossily");
            Ok(Value::String(
                String::from_utf8_lossy(e.as_bytes()).into_owned(),
            ))
        }
    }
}
