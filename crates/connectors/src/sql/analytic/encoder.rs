use chrono::{DateTime, Duration, NaiveDate, Utc};
use duckdb::types::{TimeUnit, ToSql, ToSqlOutput, Value as DuckValue, ValueRef};
use model::core::{data_type::DataType, value::Value};
use rust_decimal::prelude::ToPrimitive;
use tracing::warn;

/// Binds a logical value as a DuckDB parameter, coerced to the column type it
/// is inserted into. Unioned sources may disagree on a column's type.
pub struct DuckParam<'a> {
    pub value: &'a Value,
    pub target: DataType,
}

impl ToSql for DuckParam<'_> {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(encode_value(self.value, self.target)))
    }
}

pub fn encode_value(value: &Value, target: DataType) -> DuckValue {
    match (value, target) {
        (Value::Null, _) => DuckValue::Null,
        (Value::Boolean(v), DataType::Boolean) => DuckValue::Boolean(*v),
        (Value::Boolean(v), DataType::Int) => DuckValue::BigInt(i64::from(*v)),
        (Value::Boolean(v), DataType::Float) => DuckValue::Double(if *v { 1.0 } else { 0.0 }),
        (Value::Int(v), DataType::Float) => DuckValue::Double(*v as f64),
        (Value::Int(v), DataType::Int) => DuckValue::BigInt(*v),
        (Value::Float(v), DataType::Float) => DuckValue::Double(*v),
        (Value::Date(v), DataType::Date) => DuckValue::Text(v.format("%Y-%m-%d").to_string()),
        (Value::Timestamp(v), DataType::Timestamp) => {
            DuckValue::Text(v.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
        }
        (other, _) => DuckValue::Text(other.to_string()),
    }
}

pub fn decode_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(v) => Value::Boolean(v),
        ValueRef::TinyInt(v) => Value::Int(i64::from(v)),
        ValueRef::SmallInt(v) => Value::Int(i64::from(v)),
        ValueRef::Int(v) => Value::Int(i64::from(v)),
        ValueRef::BigInt(v) => Value::Int(v),
        ValueRef::HugeInt(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
        ValueRef::UTinyInt(v) => Value::Int(i64::from(v)),
        ValueRef::USmallInt(v) => Value::Int(i64::from(v)),
        ValueRef::UInt(v) => Value::Int(i64::from(v)),
        ValueRef::UBigInt(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
        ValueRef::Float(v) => Value::Float(f64::from(v)),
        ValueRef::Double(v) => Value::Float(v),
        ValueRef::Decimal(v) => v.to_f64().map_or(Value::Null, Value::Float),
        ValueRef::Date32(days) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_signed(Duration::days(i64::from(days))))
            .map_or(Value::Null, Value::Date),
        ValueRef::Timestamp(unit, v) => DateTime::<Utc>::from_timestamp_micros(to_micros(unit, v))
            .map_or(Value::Null, Value::Timestamp),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
        other => {
            warn!(value = ?other, "Unsupported DuckDB value, reading as NULL");
            Value::Null
        }
    }
}

fn to_micros(unit: TimeUnit, v: i64) -> i64 {
    match unit {
        TimeUnit::Second => v.saturating_mul(1_000_000),
        TimeUnit::Millisecond => v.saturating_mul(1_000),
        TimeUnit::Microsecond => v,
        TimeUnit::Nanosecond => v / 1_000,
    }
}

/// Double-quoted SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
