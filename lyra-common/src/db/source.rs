//! Data sources that answer the fixed query catalogue
//!
//! `PgSource` opens one connection per query and closes it before returning,
//! so a long-running dashboard never holds an idle connection that the
//! server may have dropped.

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Connection, Row, TypeInfo, ValueRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use super::{Query, Table};
use crate::{Error, Result};

/// Anything that can answer a fixed query with a table
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, query: Query) -> Result<Table>;
}

/// PostgreSQL source with scoped per-query connections
#[derive(Debug, Clone)]
pub struct PgSource {
    options: PgConnectOptions,
}

impl PgSource {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl DataSource for PgSource {
    async fn fetch(&self, query: Query) -> Result<Table> {
        let mut conn = PgConnection::connect_with(&self.options).await?;

        let result = sqlx::query(query.sql()).fetch_all(&mut conn).await;

        // Release the connection whether or not the query succeeded
        if let Err(e) = conn.close().await {
            warn!("Failed to close connection after {}: {}", query, e);
        }

        let rows = result?;
        let columns = query.columns();
        let mut table = Table::empty(columns);
        for row in &rows {
            if row.len() != columns.len() {
                return Err(Error::Internal(format!(
                    "{} returned {} columns, expected {}",
                    query,
                    row.len(),
                    columns.len()
                )));
            }
            table.push_row(
                (0..row.len())
                    .map(|i| decode_cell(row, i).unwrap_or_else(|| undecodable(query, row, i)))
                    .collect(),
            )?;
        }

        debug!("Fetched {} rows for {}", table.len(), query);
        Ok(table)
    }
}

/// Convert one Postgres cell to JSON
///
/// Returns `None` for a non-NULL cell of a type with no JSON mapping.
fn decode_cell(row: &PgRow, i: usize) -> Option<Value> {
    let is_null = row
        .try_get_raw(i)
        .map(|val| val.is_null())
        .unwrap_or(true);
    if is_null {
        return Some(Value::Null);
    }

    row.try_get::<String, _>(i)
        .ok()
        .map(Value::String)
        .or_else(|| row.try_get::<bool, _>(i).ok().map(Value::Bool))
        .or_else(|| row.try_get::<i64, _>(i).ok().map(|v| json!(v)))
        .or_else(|| row.try_get::<i32, _>(i).ok().map(|v| json!(v)))
        .or_else(|| row.try_get::<i16, _>(i).ok().map(|v| json!(v)))
        .or_else(|| row.try_get::<f64, _>(i).ok().map(|v| json!(v)))
        .or_else(|| {
            row.try_get::<sqlx::types::Uuid, _>(i)
                .ok()
                .map(|v| Value::String(v.to_string()))
        })
        .or_else(|| {
            row.try_get::<chrono::DateTime<chrono::Utc>, _>(i)
                .ok()
                .map(|v| Value::String(v.to_rfc3339()))
        })
        .or_else(|| {
            row.try_get::<chrono::NaiveDateTime, _>(i)
                .ok()
                .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S").to_string()))
        })
        .or_else(|| {
            row.try_get::<chrono::NaiveDate, _>(i)
                .ok()
                .map(|v| Value::String(v.format("%Y-%m-%d").to_string()))
        })
}

/// Log an undecodable cell and stand in NULL for it
fn undecodable(query: Query, row: &PgRow, i: usize) -> Value {
    let type_name = row
        .try_get_raw(i)
        .map(|val| val.type_info().name().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    warn!(
        "{}: column {} has unsupported type {}, reading it as NULL",
        query,
        query.columns().get(i).copied().unwrap_or("?"),
        type_name
    );
    Value::Null
}

/// In-memory source serving preloaded tables
///
/// A query with no registered table answers with an empty table carrying
/// the query's columns.
#[derive(Debug, Default)]
pub struct StaticSource {
    tables: HashMap<Query, Table>,
    fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: Query, table: Table) -> Self {
        self.tables.insert(query, table);
        self
    }

    /// Number of fetches answered so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self, query: Query) -> Result<Table> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tables
            .get(&query)
            .cloned()
            .unwrap_or_else(|| Table::empty(query.columns())))
    }
}
