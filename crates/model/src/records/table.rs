use crate::core::{data_type::DataType, value::Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Column {
            name: name.to_string(),
            data_type,
        }
    }
}

/// An in-memory tabular result: ordered columns and positional rows.
///
/// Every row holds exactly one value per column. Rows returned by the remote
/// store, the session table store and the federated context all share this
/// shape, so a caller never needs to know which source produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawTable")]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

/// Wire shape of a [`Table`]; decoded rows go through [`Table::new`].
#[derive(Deserialize)]
struct RawTable {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl From<RawTable> for Table {
    fn from(raw: RawTable) -> Self {
        Table::new(raw.columns, raw.rows)
    }
}

impl Table {
    /// Builds a table, padding short rows with `NULL` and dropping extra cells.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Table { columns, rows }
    }

    pub fn empty() -> Self {
        Table::default()
    }

    /// Builds a table from column names, inferring each column's type from its values.
    pub fn from_rows(names: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let mut columns: Vec<Column> = names
            .iter()
            .map(|name| Column::new(name, DataType::Null))
            .collect();
        for row in &rows {
            for (column, value) in columns.iter_mut().zip(row) {
                column.data_type = column.data_type.unify(value.data_type());
            }
        }
        Table::new(columns, rows)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Stacks tables vertically. The resulting columns are the union of the
    /// inputs' columns in first-seen order; cells a source does not provide
    /// are `NULL`. Column types are widened across sources.
    pub fn concat<I>(tables: I) -> Table
    where
        I: IntoIterator<Item = Table>,
    {
        let mut columns: Vec<Column> = Vec::new();
        let mut rows = Vec::new();

        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .map(|col| match columns.iter().position(|c| c.name == col.name) {
                    Some(idx) => {
                        columns[idx].data_type = columns[idx].data_type.unify(col.data_type);
                        idx
                    }
                    None => {
                        columns.push(col.clone());
                        columns.len() - 1
                    }
                })
                .collect();

            for row in table.rows {
                let mut merged = vec![Value::Null; columns.len()];
                for (value, &target) in row.into_iter().zip(&mapping) {
                    merged[target] = value;
                }
                rows.push(merged);
            }
        }

        Table::new(columns, rows)
    }

    /// Keeps at most `cap` rows.
    pub fn truncate(&mut self, cap: usize) {
        self.rows.truncate(cap);
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, value)| {
                        let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                        (col.name.clone(), json)
                    })
                    .collect()
            })
            .collect()
    }
}
