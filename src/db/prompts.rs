//! Prompt database operations
//!
//! Prompts are either static (attached to the project, no script) or dynamic
//! (attached to a script). A session sees its script's prompts plus the
//! project's static ones, in position order.

use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::db::parse_json;
use crate::error::Result;

/// Prompt record
#[derive(Debug, Clone)]
pub struct PromptRecord {
    pub prompt_type: String,
    pub corpus_code: Option<String>,
    pub attributes: Value,
    pub inputs: Value,
    pub position: i64,
}

impl PromptRecord {
    /// Input names declared by this prompt (for input prompts).
    pub fn input_names(&self) -> Vec<String> {
        match self.inputs.as_array() {
            Some(entries) => entries
                .iter()
                .filter_map(|e| e.get("name")?.as_str().map(str::to_string))
                .collect(),
            None => Vec::new(),
        }
    }
}

fn from_row(row: sqlx::sqlite::SqliteRow) -> Result<PromptRecord> {
    let attributes: Option<String> = row.get("attributes");
    let inputs: Option<String> = row.get("inputs");

    Ok(PromptRecord {
        prompt_type: row.get("prompt_type"),
        corpus_code: row.get("corpus_code"),
        attributes: match attributes {
            Some(json) if !json.is_empty() => parse_json(&json, "prompt attributes")?,
            _ => Value::Null,
        },
        inputs: match inputs {
            Some(json) if !json.is_empty() => parse_json(&json, "prompt inputs")?,
            _ => Value::Null,
        },
        position: row.get("position"),
    })
}

/// List the prompts a session sees: its script's prompts plus the project's
/// static prompts, in position order.
pub async fn list_for_script(
    pool: &SqlitePool,
    project_id: i64,
    script_id: Option<i64>,
) -> Result<Vec<PromptRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT prompt_type, corpus_code, attributes, inputs, position
        FROM prompts
        WHERE project_id = ?
          AND (script_id IS NULL OR script_id = ?)
        ORDER BY position ASC, id ASC
        "#,
    )
    .bind(project_id)
    .bind(script_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(from_row).collect()
}

/// List the project's input prompts: static ones when any exist, otherwise
/// the script-attached ones.
pub async fn list_input_prompts(pool: &SqlitePool, project_id: i64) -> Result<Vec<PromptRecord>> {
    let static_prompts = sqlx::query(
        r#"
        SELECT prompt_type, corpus_code, attributes, inputs, position
        FROM prompts
        WHERE project_id = ? AND prompt_type = 'input' AND script_id IS NULL
        ORDER BY position ASC, id ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    let rows = if static_prompts.is_empty() {
        sqlx::query(
            r#"
            SELECT prompt_type, corpus_code, attributes, inputs, position
            FROM prompts
            WHERE project_id = ? AND prompt_type = 'input' AND script_id IS NOT NULL
            ORDER BY position ASC, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?
    } else {
        static_prompts
    };

    rows.into_iter().map(from_row).collect()
}
