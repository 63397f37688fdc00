//! Item database operations
//!
//! Items carry their collection-time attributes as a JSON map. The keys the
//! report cares about are `skipped`, `prompttype`, `corpuscode` and the
//! optional `deviceinfo.location` fallback for photo coordinates.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::db::{parse_json, parse_timestamp};
use crate::error::Result;

/// Item record
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub id: i64,
    pub session_id: i64,
    pub path: String,
    pub created: DateTime<Utc>,
    pub attributes: Value,
}

impl ItemRecord {
    fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)?.as_str()
    }

    /// Collection marked this item skipped.
    pub fn skipped(&self) -> bool {
        match self.attributes.get("skipped") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    pub fn prompt_type(&self) -> Option<&str> {
        self.attr_str("prompttype")
    }

    pub fn corpus_code(&self) -> Option<&str> {
        self.attr_str("corpuscode")
    }

    /// Device-reported capture location, when the item carries one.
    pub fn device_location(&self) -> Option<(f64, f64)> {
        let location = self.attributes.get("deviceinfo")?.get("location")?;
        let lat = lenient_f64(location.get("latitude")?)?;
        let lng = lenient_f64(location.get("longitude")?)?;
        Some((lat, lng))
    }

    /// File name portion of the storage path.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Count the items of a session.
pub async fn count_for_session(pool: &SqlitePool, session_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE session_id = ?")
        .bind(session_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// List the items of a session, oldest first.
pub async fn list_for_session(pool: &SqlitePool, session_id: i64) -> Result<Vec<ItemRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, path, created, attributes
        FROM items
        WHERE session_id = ?
        ORDER BY created ASC, id ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let created: String = row.get("created");
        let attributes: String = row.get("attributes");

        items.push(ItemRecord {
            id: row.get("id"),
            session_id: row.get("session_id"),
            path: row.get("path"),
            created: parse_timestamp(&created, "item created")?,
            attributes: parse_json(&attributes, "item attributes")?,
        });
    }

    Ok(items)
}

/// Distinct corpus codes used by a project's image items.
///
/// Used once at plan time so photo columns for unmapped codes exist before
/// any worker runs.
pub async fn distinct_image_corpus_codes(
    pool: &SqlitePool,
    project_id: i64,
) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT json_extract(items.attributes, '$.corpuscode') AS corpus_code
        FROM items
        JOIN sessions ON sessions.id = items.session_id
        WHERE sessions.project_id = ?
          AND json_extract(items.attributes, '$.prompttype') = 'image'
        ORDER BY corpus_code ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| row.get::<Option<String>, _>("corpus_code"))
        .collect())
}
