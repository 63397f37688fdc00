//! Demographic lookup operations
//!
//! Demographic records live in their own tables, keyed by the numeric id
//! embedded in the pin string. Absent records and absent attributes are
//! normal; the report leaves those cells alone.

use sqlx::{Row, SqlitePool};

use crate::error::Result;

/// Demographic user record
#[derive(Debug, Clone)]
pub struct ConnectUser {
    pub id: i64,
    pub email: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

/// Load a demographic user by id.
pub async fn fetch_user(pool: &SqlitePool, user_id: i64) -> Result<Option<ConnectUser>> {
    let row = sqlx::query(
        r#"
        SELECT id, email, country, state, city
        FROM connect_users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| ConnectUser {
        id: row.get("id"),
        email: row.get("email"),
        country: row.get("country"),
        state: row.get("state"),
        city: row.get("city"),
    }))
}

/// Load one attribute value for a demographic user.
pub async fn fetch_attribute(
    pool: &SqlitePool,
    user_id: i64,
    attribute_id: i64,
) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar(
        r#"
        SELECT value
        FROM connect_user_attributes
        WHERE user_id = ? AND attribute_id = ?
        "#,
    )
    .bind(user_id)
    .bind(attribute_id)
    .fetch_optional(pool)
    .await?;

    Ok(value)
}
