//! Session database operations

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::db::{parse_json, parse_timestamp};
use crate::error::Result;

/// Session record
///
/// The directory name is the stable identity that links live sessions to
/// cached report rows. A session with either flag set no longer changes.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub pin_id: Option<i64>,
    pub created: DateTime<Utc>,
    pub completed: bool,
    pub abandoned: bool,
    pub duration: Option<f64>,
    pub device_info: Option<Value>,
}

impl SessionRecord {
    pub fn finalized(&self) -> bool {
        self.completed || self.abandoned
    }
}

/// List every session of a project, oldest first.
pub async fn list_for_project(pool: &SqlitePool, project_id: i64) -> Result<Vec<SessionRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, project_id, name, pin_id, created, completed, abandoned, duration, device_info
        FROM sessions
        WHERE project_id = ?
        ORDER BY created ASC, id ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    let mut sessions = Vec::with_capacity(rows.len());
    for row in rows {
        let created: String = row.get("created");
        let device_info: Option<String> = row.get("device_info");
        let device_info = match device_info {
            Some(json) if !json.is_empty() => Some(parse_json(&json, "session device_info")?),
            _ => None,
        };

        sessions.push(SessionRecord {
            id: row.get("id"),
            project_id: row.get("project_id"),
            name: row.get("name"),
            pin_id: row.get("pin_id"),
            created: parse_timestamp(&created, "session created")?,
            completed: row.get::<i64, _>("completed") != 0,
            abandoned: row.get::<i64, _>("abandoned") != 0,
            duration: row.get("duration"),
            device_info,
        });
    }

    Ok(sessions)
}
