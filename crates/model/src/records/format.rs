use crate::records::table::Table;
use std::fmt;

/// Plain-text rendering: a header line followed by right-aligned cells,
/// columns separated by two spaces. Used for LLM transcripts and the CLI.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns().is_empty() {
            return write!(f, "(empty result)");
        }

        let cells: Vec<Vec<String>> = self
            .rows()
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns()
            .iter()
            .enumerate()
            .map(|(i, col)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(col.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = self
            .columns()
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:>w$}", col.name, w = *w))
            .collect();
        write!(f, "{}", header.join("  "))?;

        if cells.is_empty() {
            return write!(f, "\n(no rows)");
        }

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:>w$}", cell, w = *w))
                .collect();
            write!(f, "\n{}", line.join("  "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{core::value::Value, records::table::Table};

    #[test]
    fn renders_aligned_columns() {
        let table = Table::from_rows(
            &["sex", "avg_bmi"],
            vec![
                vec![Value::Int(0), Value::Float(27.4)],
                vec![Value::Int(1), Value::Float(24.75)],
            ],
        );
        assert_eq!(table.to_string(), "sex  avg_bmi\n  0     27.4\n  1    24.75");
    }

    #[test]
    fn renders_no_rows() {
        let table = Table::from_rows(&["n"], vec![]);
        assert_eq!(table.to_string(), "n\n(no rows)");
        assert_eq!(Table::empty().to_string(), "(empty result)");
    }
}
