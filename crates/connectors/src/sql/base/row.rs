use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core::fmt;
use model::core::{data_type::DataType, value::Value};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::fmt::Formatter;
use tokio_postgres::{
    Column as PgColumn, Row as PgRow,
    types::{FromSql, Json as PgJson},
};
use tracing::warn;

pub enum DbRow<'a> {
    PostgresRow(&'a PgRow),
}

impl<'a> DbRow<'a> {
    /// Decodes every column of the row into logical values, in column order.
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            DbRow::PostgresRow(row) => row
                .columns()
                .iter()
                .enumerate()
                .map(|(idx, column)| self.get_value(idx, column))
                .collect(),
        }
    }

    pub fn get_value(&self, idx: usize, column: &PgColumn) -> Value {
        let DbRow::PostgresRow(row) = self;
        let type_name = column.type_().name();

        let decoded = match type_name {
            "int2" => decode::<i16>(row, idx, |v| Value::Int(v as i64)),
            "int4" => decode::<i32>(row, idx, |v| Value::Int(v as i64)),
            "int8" => decode::<i64>(row, idx, Value::Int),
            "oid" => decode::<u32>(row, idx, |v| Value::Int(v as i64)),
            "float4" => decode::<f32>(row, idx, |v| Value::Float(v as f64)),
            "float8" => decode::<f64>(row, idx, Value::Float),
            "numeric" => decode::<Decimal>(row, idx, |v| {
                v.to_f64().map_or(Value::Null, Value::Float)
            }),
            "bool" => decode::<bool>(row, idx, Value::Boolean),
            "date" => decode::<NaiveDate>(row, idx, Value::Date),
            "timestamp" => decode::<NaiveDateTime>(row, idx, |naive| {
                Value::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
            }),
            "timestamptz" => decode::<DateTime<Utc>>(row, idx, Value::Timestamp),
            "json" | "jsonb" => decode::<PgJson<serde_json::Value>>(row, idx, |json| {
                Value::String(json.0.to_string())
            }),
            _ => {
                if DataType::from_postgres_type(type_name).is_err() {
                    warn!(column = column.name(), type_name, "Unknown column type, reading as text");
                }
                decode::<String>(row, idx, Value::String)
            }
        };

        decoded.unwrap_or_else(|| {
            warn!(column = column.name(), type_name, "Failed to decode column value");
            Value::Null
        })
    }
}

/// `None` when the cell cannot be decoded as `T`; SQL NULL decodes to `Value::Null`.
fn decode<'r, T>(row: &'r PgRow, idx: usize, convert: impl FnOnce(T) -> Value) -> Option<Value>
where
    T: FromSql<'r>,
{
    row.try_get::<_, Option<T>>(idx)
        .ok()
        .map(|cell| cell.map_or(Value::Null, convert))
}

impl fmt::Debug for DbRow<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DbRow::PostgresRow(row) => write!(f, "{row:?}"),
        }
    }
}
