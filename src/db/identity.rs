//! Pin identity operations
//!
//! Resolves a session's pin to the submitter's pin string, email and script
//! number in one query.

use sqlx::{Row, SqlitePool};

use crate::error::Result;

/// Identity behind a session's pin
#[derive(Debug, Clone)]
pub struct PinIdentity {
    pub pin: String,
    pub email: Option<String>,
    pub script_id: Option<i64>,
    pub script_number: Option<i64>,
}

/// Load the identity for a pin id.
pub async fn fetch_for_pin(pool: &SqlitePool, pin_id: i64) -> Result<Option<PinIdentity>> {
    let row = sqlx::query(
        r#"
        SELECT pins.pin AS pin,
               users.email AS email,
               scripts.id AS script_id,
               scripts.number AS script_number
        FROM pins
        LEFT JOIN users ON users.id = pins.user_id
        LEFT JOIN scripts ON scripts.id = pins.script_id
        WHERE pins.id = ?
        "#,
    )
    .bind(pin_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| PinIdentity {
        pin: row.get("pin"),
        email: row.get("email"),
        script_id: row.get("script_id"),
        script_number: row.get("script_number"),
    }))
}
