//! Read-only data access for the project database
//!
//! Every query is a fixed SELECT from [`Query`]; results come back as a
//! [`Table`] through the [`DataSource`] seam.

mod query;
mod source;
mod table;

pub use query::Query;
pub use source::{DataSource, PgSource, StaticSource};
pub use table::{cell_key, Table};
