use crate::sql::{
    analytic::encoder::{DuckParam, decode_value, quote_ident},
    base::error::DbError,
};
use duckdb::{Connection, params_from_iter};
use model::records::table::Table;
use tracing::debug;

/// An in-memory DuckDB database used as an analytical execution context.
///
/// DuckDB reads the PostgreSQL dialect the generated statements are written
/// in (`::` casts, `ILIKE`, `STDDEV`, `DATE_TRUNC`), so a statement behaves
/// the same here and on the remote store.
#[derive(Debug)]
pub struct AnalyticContext {
    conn: Connection,
}

impl AnalyticContext {
    pub fn in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Ok(AnalyticContext { conn })
    }

    /// Materializes `table` under `name`, replacing any previous table of that name.
    pub fn register(&mut self, name: &str, table: &Table) -> Result<(), DbError> {
        if name.trim().is_empty() {
            return Err(DbError::InvalidTable {
                name: name.to_string(),
                reason: "table name is empty".into(),
            });
        }
        if table.columns().is_empty() {
            return Err(DbError::InvalidTable {
                name: name.to_string(),
                reason: "table has no columns".into(),
            });
        }

        let ident = quote_ident(name);
        let column_defs = table
            .columns()
            .iter()
            .map(|col| format!("{} {}", quote_ident(&col.name), col.data_type.duckdb_name()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; table.columns().len()].join(", ");
        let types: Vec<_> = table.columns().iter().map(|col| col.data_type).collect();

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {ident}; CREATE TABLE {ident} ({column_defs});"
        ))?;
        {
            let mut insert = tx.prepare(&format!("INSERT INTO {ident} VALUES ({placeholders})"))?;
            for row in table.rows() {
                let params = row
                    .iter()
                    .zip(&types)
                    .map(|(value, target)| DuckParam { value, target: *target });
                insert.execute(params_from_iter(params))?;
            }
        }
        tx.commit()?;

        debug!(table = name, rows = table.row_count(), "Registered table");
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> Result<(), DbError> {
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)))?;
        Ok(())
    }

    /// Runs a single statement and collects its result set.
    pub fn query(&self, sql: &str) -> Result<Table, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        // Result columns are only known once the statement has run.
        let names = rows.as_ref().map(|s| s.column_names()).unwrap_or_default();
        let width = names.len();

        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(decode_value(row.get_ref(idx)?));
            }
            values.push(cells);
        }

        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        Ok(Table::from_rows(&names, values))
    }

    /// Full contents of one table.
    pub fn fetch(&self, name: &str) -> Result<Table, DbError> {
        self.query(&format!("SELECT * FROM {}", quote_ident(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;

    fn sample() -> Table {
        Table::from_rows(
            &["patient_number", "bmi", "smoking"],
            vec![
                vec![Value::Int(1), Value::Float(31.0), Value::Boolean(true)],
                vec![Value::Int(2), Value::Float(24.0), Value::Boolean(false)],
                vec![Value::Int(3), Value::Null, Value::Boolean(false)],
            ],
        )
    }

    #[test]
    fn registers_and_queries() {
        let mut ctx = AnalyticContext::in_memory().unwrap();
        ctx.register("patients", &sample()).unwrap();

        let result = ctx
            .query("SELECT COUNT(*) AS n, AVG(bmi) AS avg_bmi FROM patients WHERE NOT smoking")
            .unwrap();
        assert_eq!(result.column_names(), vec!["n", "avg_bmi"]);
        assert_eq!(result.value(0, "n"), Some(&Value::Int(2)));
        assert_eq!(result.value(0, "avg_bmi"), Some(&Value::Float(24.0)));
    }

    #[test]
    fn runs_postgres_dialect() {
        let mut ctx = AnalyticContext::in_memory().unwrap();
        ctx.register("patients", &sample()).unwrap();

        let result = ctx
            .query(
                "SELECT COUNT(*)::int AS n, ROUND(AVG(bmi)::numeric, 2) AS avg_bmi, \
                 STDDEV(bmi) AS sd FROM patients",
            )
            .unwrap();
        assert_eq!(result.value(0, "n"), Some(&Value::Int(3)));
        assert_eq!(result.value(0, "avg_bmi"), Some(&Value::Float(27.5)));
        assert!(result.value(0, "sd").and_then(Value::as_f64).is_some());
    }

    #[test]
    fn empty_result_keeps_columns() {
        let mut ctx = AnalyticContext::in_memory().unwrap();
        ctx.register("patients", &sample()).unwrap();

        let result = ctx
            .query("SELECT patient_number FROM patients WHERE bmi > 100")
            .unwrap();
        assert_eq!(result.column_names(), vec!["patient_number"]);
        assert!(result.is_empty());
    }

    #[test]
    fn register_replaces_existing() {
        let mut ctx = AnalyticContext::in_memory().unwrap();
        ctx.register("patients", &sample()).unwrap();
        let one = Table::from_rows(&["patient_number"], vec![vec![Value::Int(9)]]);
        ctx.register("patients", &one).unwrap();

        assert_eq!(ctx.fetch("patients").unwrap().row_count(), 1);
    }

    #[test]
    fn rejects_tables_without_columns() {
        let mut ctx = AnalyticContext::in_memory().unwrap();
        let err = ctx.register("empty", &Table::empty()).unwrap_err();
        assert!(matches!(err, DbError::InvalidTable { .. }));
    }

    #[test]
    fn query_errors_on_missing_table() {
        let ctx = AnalyticContext::in_memory().unwrap();
        assert!(matches!(
            ctx.query("SELECT 1 FROM patients"),
            Err(DbError::DuckDbError(_))
        ));
    }
}
