//! Stat database operations
//!
//! Stats are timestamped JSON documents produced by the processing pipeline,
//! joined to items by storage path. Several may exist for one item; the
//! newest one is authoritative.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::db::{parse_json, parse_timestamp};
use crate::error::Result;

/// One stat document
#[derive(Debug, Clone)]
pub struct StatRecord {
    pub created: DateTime<Utc>,
    pub data: Value,
}

/// Load the newest stat for an item path, if any exists.
pub async fn latest_for_path(pool: &SqlitePool, item_path: &str) -> Result<Option<StatRecord>> {
    let row = sqlx::query(
        r#"
        SELECT created, data
        FROM stats
        WHERE item_path = ?
        ORDER BY created DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(item_path)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let created: String = row.get("created");
            let data: String = row.get("data");

            Ok(Some(StatRecord {
                created: parse_timestamp(&created, "stat created")?,
                data: parse_json(&data, "stat data")?,
            }))
        }
        None => Ok(None),
    }
}
