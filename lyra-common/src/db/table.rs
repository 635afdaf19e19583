//! In-memory result tables
//!
//! A `Table` is the row set of one query: named columns plus rows of JSON
//! cells. SQL NULL is `Value::Null`.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Tabular query result with named columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names
    pub fn empty<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from column names and rows
    ///
    /// Every row must have exactly one cell per column.
    pub fn new<S: AsRef<str>>(columns: &[S], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut table = Self::empty(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row, rejecting rows of the wrong width
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::InvalidInput(format!(
                "Row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Index of a named column
    pub fn column(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown column: {}", name)))
    }

    /// Iterate over the cells of one column
    pub fn values<'a>(&'a self, name: &str) -> Result<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.column(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Keep only rows matching the predicate
    pub fn filter<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[Value]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render a cell as a grouping key; `None` for NULL
///
/// Strings are taken as-is, booleans and numbers use their JSON text.
pub fn cell_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_lookup() {
        let table = Table::empty(&["name", "gender"]);
        assert_eq!(table.column("gender").unwrap(), 1);
        assert!(matches!(table.column("age"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut table = Table::empty(&["a", "b"]);
        assert!(table.push_row(vec![json!(1)]).is_err());
        assert!(table.push_row(vec![json!(1), json!(2)]).is_ok());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_filter_keeps_columns() {
        let table = Table::new(
            &["n"],
            vec![vec![json!(1)], vec![json!(2)], vec![json!(3)]],
        )
        .unwrap();
        let odd = table.filter(|row| row[0].as_i64().unwrap_or(0) % 2 == 1);
        assert_eq!(odd.columns, vec!["n"]);
        assert_eq!(odd.len(), 2);
    }

    #[test]
    fn test_cell_key() {
        assert_eq!(cell_key(&json!("F")), Some("F".to_string()));
        assert_eq!(cell_key(&json!(true)), Some("true".to_string()));
        assert_eq!(cell_key(&json!(7)), Some("7".to_string()));
        assert_eq!(cell_key(&Value::Null), None);
    }
}
