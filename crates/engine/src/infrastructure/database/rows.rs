//! Driver rows to JSON maps.

use serde_json::{Map, Number, Value};
use sqlx::any::AnyRow;
use sqlx::{Column, Row};

/// Convert a row into `{column: value}`.
///
/// Integers, floats, booleans and text map to their JSON counterparts;
/// binary data is decoded lossily as UTF-8. NULL, non-finite floats and
/// anything the driver cannot decode become `null`.
pub fn row_to_json(row: &AnyRow) -> Map<String, Value> {
    row.columns()
        .iter()
        .map(|column| {
            let index = column.ordinal();
            (column.name().to_string(), decode_cell(row, index))
        })
        .collect()
}

fn decode_cell(row: &AnyRow, index: usize) -> Value {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return value.map(Value::Bool).unwrap_or(Value::Null);
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(Some(bytes)) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return Value::String(String::from_utf8_lossy(&bytes).into_owned());
    }
    Value::Null
}
