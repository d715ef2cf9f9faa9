use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical column type shared by every source the federator reads from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Float,
    Boolean,
    String,
    Date,
    Timestamp,
    Null,
}

impl DataType {
    pub fn from_postgres_type(type_name: &str) -> Result<Self, String> {
        let normalized = Self::normalize_type_name(type_name);
        let data_type = match normalized.as_str() {
            "int2" | "int4" | "int8" | "smallint" | "integer" | "bigint" | "serial"
            | "bigserial" | "oid" => DataType::Int,
            "float4" | "float8" | "real" | "double precision" | "numeric" | "decimal" => {
                DataType::Float
            }
            "bool" | "boolean" => DataType::Boolean,
            "text" | "varchar" | "character varying" | "bpchar" | "char" | "character"
            | "name" | "uuid" | "json" | "jsonb" => DataType::String,
            "date" => DataType::Date,
            "timestamp" | "timestamptz" | "timestamp without time zone"
            | "timestamp with time zone" => DataType::Timestamp,
            "void" | "unknown" => DataType::Null,
            _ => return Err(format!("Unknown Postgres column type: {type_name}")),
        };
        Ok(data_type)
    }

    /// Column type used when the type is materialized in DuckDB. A column that
    /// only ever held `NULL` becomes `VARCHAR`.
    pub fn duckdb_name(&self) -> &'static str {
        match self {
            DataType::Int => "BIGINT",
            DataType::Float => "DOUBLE",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
            DataType::String | DataType::Null => "VARCHAR",
        }
    }

    /// Widest type able to hold values of both `self` and `other`.
    pub fn unify(self, other: DataType) -> DataType {
        use DataType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, t) | (t, Null) => t,
            (Int, Float) | (Float, Int) => Float,
            (Boolean, Int) | (Int, Boolean) => Int,
            (Boolean, Float) | (Float, Boolean) => Float,
            _ => String,
        }
    }

    fn normalize_type_name(type_name: &str) -> String {
        let lower = type_name.trim().to_ascii_lowercase();
        match lower.find('(') {
            Some(idx) => lower[..idx].trim_end().to_string(),
            None => lower,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::String => "string",
            DataType::Date => "date",
            DataType::Timestamp => "timestamp",
            DataType::Null => "null",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_names_map_to_logical_types() {
        assert_eq!(DataType::from_postgres_type("INT4"), Ok(DataType::Int));
        assert_eq!(DataType::from_postgres_type("numeric(10,2)"), Ok(DataType::Float));
        assert_eq!(DataType::from_postgres_type("varchar(45)"), Ok(DataType::String));
        assert_eq!(DataType::from_postgres_type("timestamptz"), Ok(DataType::Timestamp));
        assert!(DataType::from_postgres_type("tsvector").is_err());
    }

    #[test]
    fn unify_widens() {
        assert_eq!(DataType::Int.unify(DataType::Float), DataType::Float);
        assert_eq!(DataType::Null.unify(DataType::Date), DataType::Date);
        assert_eq!(DataType::Int.unify(DataType::String), DataType::String);
        assert_eq!(DataType::Boolean.unify(DataType::Int), DataType::Int);
    }
}
