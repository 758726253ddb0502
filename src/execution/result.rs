//! Row conversion from engine output to JSON-serializable records.

use crate::error::{CopilotError, Result};
use polars::prelude::*;

/// One result row as an ordered column→value mapping.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Convert a DataFrame into JSON rows, preserving column order.
pub fn dataframe_to_rows(df: &DataFrame) -> Result<Vec<Row>> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let mut row = Row::new();
        for col_name in &columns {
            let series = df
                .column(col_name)
                .map_err(|e| CopilotError::Execution(format!("Missing column {}: {}", col_name, e)))?;
            row.insert(col_name.clone(), any_value_to_json(series, row_idx)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

fn any_value_to_json(series: &Series, row_idx: usize) -> Result<serde_json::Value> {
    use serde_json::Value;

    let any_val = series
        .get(row_idx)
        .map_err(|e| CopilotError::Execution(format!("Failed to read value: {}", e)))?;

    if any_val.is_null() {
        return Ok(Value::Null);
    }

    let value = match any_val {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),
        AnyValue::Float32(f) => serde_json::Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Date(days) => Value::String(format_date(days)),
        AnyValue::Datetime(ts, unit, _) => Value::String(format_datetime(ts, unit)),
        other => Value::String(format!("{:?}", other)),
    };
    Ok(value)
}

fn format_date(days_since_epoch: i32) -> String {
    let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");
    (epoch + chrono::Duration::days(days_since_epoch as i64)).to_string()
}

fn format_datetime(ts: i64, unit: TimeUnit) -> String {
    let (secs, nanos) = match unit {
        TimeUnit::Nanoseconds => (ts.div_euclid(1_000_000_000), ts.rem_euclid(1_000_000_000)),
        TimeUnit::Microseconds => (ts.div_euclid(1_000_000), ts.rem_euclid(1_000_000) * 1_000),
        TimeUnit::Milliseconds => (ts.div_euclid(1_000), ts.rem_euclid(1_000) * 1_000_000),
    };
    match chrono::DateTime::from_timestamp(secs, nanos as u32) {
        Some(dt) => dt.naive_utc().to_string(),
        None => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataframe_to_rows_preserves_order_and_types() {
        let df = df! [
            "country" => ["DE", "FR"],
            "revenue" => [100.5, 90.0],
            "orders" => [3i64, 2]
        ]
        .unwrap();

        let rows = dataframe_to_rows(&df).unwrap();
        assert_eq!(rows.len(), 2);
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, ["country", "revenue", "orders"]);
        assert_eq!(rows[0]["country"], serde_json::json!("DE"));
        assert_eq!(rows[1]["orders"], serde_json::json!(2));
    }

    #[test]
    fn test_null_becomes_json_null() {
        let df = df! [
            "amount" => [Some(1.0), None]
        ]
        .unwrap();
        let rows = dataframe_to_rows(&df).unwrap();
        assert_eq!(rows[1]["amount"], serde_json::Value::Null);
    }
}
