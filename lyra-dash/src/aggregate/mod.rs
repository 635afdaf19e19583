//! Aggregation functions: raw tables in, small count tables out
//!
//! Every function here is pure. Rows with a NULL in the grouping column are
//! dropped before counting, never bucketed.

use lyra_common::db::{cell_key, Table};
use lyra_common::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

mod files;
mod genre;
mod stats;

pub use files::{file_extension, with_extension_column};
pub use genre::{genre_category_triples, normalize_genre, FileCategory};
pub use stats::*;

/// Singer name used by the ingestion job's placeholder row
pub const SCRAPER_SENTINEL: &str = "scraper";

/// Ordered `(key, count)` summary table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    entries: Vec<(String, u64)>,
}

impl Counts {
    pub fn from_entries(entries: Vec<(String, u64)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    /// Count for a key, zero when absent
    pub fn get(&self, key: &str) -> u64 {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rename keys, e.g. `true`/`false` to display labels
    pub fn map_keys<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(k, v)| (f(&k), v))
                .collect(),
        }
    }

    /// Reorder entries by key
    pub fn sorted_by_key(mut self) -> Self {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }
}

/// Two-dimensional count matrix with zero fill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<u64>>,
}

impl Matrix {
    /// Count for a combination; zero when either key is absent
    pub fn get(&self, row: &str, column: &str) -> u64 {
        let r = self.rows.iter().position(|k| k == row);
        let c = self.columns.iter().position(|k| k == column);
        match (r, c) {
            (Some(r), Some(c)) => self.cells[r][c],
            _ => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Count non-null keys of a column in first-appearance order
pub fn count_in_order(table: &Table, column: &str) -> Result<Counts> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<(String, u64)> = Vec::new();

    for value in table.values(column)? {
        let Some(key) = cell_key(value) else {
            continue;
        };
        match index.get(&key) {
            Some(&i) => entries[i].1 += 1,
            None => {
                index.insert(key.clone(), entries.len());
                entries.push((key, 1));
            }
        }
    }

    Ok(Counts { entries })
}

/// Count non-null keys of a column, most frequent first
///
/// Ties keep first-appearance order.
pub fn value_counts(table: &Table, column: &str) -> Result<Counts> {
    let mut counts = count_in_order(table, column)?;
    counts.entries.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

/// Drop rows whose cell equals the sentinel exactly
pub fn exclude_sentinel(table: &Table, column: &str, sentinel: &str) -> Result<Table> {
    let idx = table.column(column)?;
    Ok(table.filter(|row| row[idx].as_str() != Some(sentinel)))
}

/// Keep the first row for each distinct key of a column
///
/// Rows with a NULL key are all kept.
pub fn dedup_by(table: &Table, column: &str) -> Result<Table> {
    let idx = table.column(column)?;
    let mut seen: HashSet<String> = HashSet::new();
    Ok(table.filter(|row| match cell_key(&row[idx]) {
        Some(key) => seen.insert(key),
        None => true,
    }))
}

/// Add a column computed from an existing one
pub fn derive_column<F>(table: &Table, source: &str, name: &str, f: F) -> Result<Table>
where
    F: Fn(&Value) -> Value,
{
    let idx = table.column(source)?;
    let mut columns = table.columns.clone();
    columns.push(name.to_string());
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            let derived = f(&row[idx]);
            row.push(derived);
            row
        })
        .collect();
    Table::new(&columns, rows)
}

/// Count `(row_col, col_col)` pairs into a zero-filled matrix
///
/// Rows and columns appear in first-appearance order. Rows with a NULL in
/// either column are dropped.
pub fn pivot_counts(table: &Table, row_col: &str, col_col: &str) -> Result<Matrix> {
    let r_idx = table.column(row_col)?;
    let c_idx = table.column(col_col)?;

    let mut matrix = Matrix::default();
    let mut row_index: HashMap<String, usize> = HashMap::new();
    let mut col_index: HashMap<String, usize> = HashMap::new();
    let mut pairs: Vec<(usize, usize)> = Vec::new();

    for row in &table.rows {
        let (Some(r_key), Some(c_key)) = (cell_key(&row[r_idx]), cell_key(&row[c_idx])) else {
            continue;
        };
        let r = *row_index.entry(r_key.clone()).or_insert_with(|| {
            matrix.rows.push(r_key);
            matrix.rows.len() - 1
        });
        let c = *col_index.entry(c_key.clone()).or_insert_with(|| {
            matrix.columns.push(c_key);
            matrix.columns.len() - 1
        });
        pairs.push((r, c));
    }

    matrix.cells = vec![vec![0; matrix.columns.len()]; matrix.rows.len()];
    for (r, c) in pairs {
        matrix.cells[r][c] += 1;
    }

    Ok(matrix)
}
