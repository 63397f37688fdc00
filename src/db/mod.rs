//! Read-only query layer over the collection database
//!
//! One module per record family. The tool never writes to this database;
//! every function here is a SELECT.

pub mod demographics;
pub mod identity;
pub mod items;
pub mod projects;
pub mod prompts;
pub mod sessions;
pub mod stats;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{Error, Result};

/// Open the collection database pool.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let pool = SqlitePool::connect(url).await?;
    Ok(pool)
}

/// Parse a stored RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

/// Parse a stored JSON column.
pub(crate) fn parse_json(value: &str, column: &str) -> Result<serde_json::Value> {
    serde_json::from_str(value)
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}
