//! # Lyra Common Library
//!
//! Shared code for the Lyra dashboard:
//! - Error type
//! - Database configuration loading
//! - Fixed query catalogue and data sources

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
