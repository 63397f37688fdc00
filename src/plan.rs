//! Report plan
//!
//! The complete header layout for both report tables, computed once before
//! any session work starts. Workers never extend headers at runtime; a cell
//! whose column is not in the plan is simply not emitted. This keeps header
//! order identical between runs, which the cache loader depends on.

use sqlx::SqlitePool;
use tracing::warn;

use crate::config::ReportConfig;
use crate::db;
use crate::error::Result;

/// Base columns of the Sessions table, in order.
pub const SESSION_HEADERS: &[&str] = &[
    "Directory Name",
    "Pin",
    "Total items",
    "Recorded items",
    "Skipped items",
    "Rejected items",
    "Duration",
    "Date",
    "Completed",
    "Abandoned",
    "Email",
    "Device IP",
    "Device ID",
    "Device Model",
    "Device OS",
    "Country",
    "Country Code",
    "Region",
    "Region Name",
];

/// Base columns of the Stats table, in order.
pub const STAT_HEADERS: &[&str] = &["Session", "File", "Reason"];

/// Corpus code to photo column base name.
pub const PHOTO_PROMPTS: &[(&str, &str)] = &[
    ("1image1", "ev_station"),
    ("1image2", "user_interface"),
    ("1image3", "plug"),
];

/// Column base name for photo items whose corpus code has no mapping.
pub const MISSING_PROMPT: &str = "missing_prompt";

pub fn photo_prompt_name(corpus_code: &str) -> Option<&'static str> {
    PHOTO_PROMPTS
        .iter()
        .find(|(code, _)| *code == corpus_code)
        .map(|(_, name)| *name)
}

/// Immutable header layout plus the lookup sets aggregation needs.
#[derive(Debug, Clone)]
pub struct ReportPlan {
    pub session_headers: Vec<String>,
    pub stat_headers: Vec<String>,
    /// Validation schema columns, in stat-header order.
    pub stat_columns: Vec<String>,
    /// Corpus codes whose items carry free-text input answers.
    pub input_corpus_codes: Vec<String>,
}

impl ReportPlan {
    pub async fn build(pool: &SqlitePool, project_id: i64, cfg: &ReportConfig) -> Result<Self> {
        let mut session_headers: Vec<String> =
            SESSION_HEADERS.iter().map(|s| s.to_string()).collect();
        let mut stat_headers: Vec<String> = STAT_HEADERS.iter().map(|s| s.to_string()).collect();

        let stat_columns = match &cfg.schema {
            Some(schema) => schema.columns(),
            None => Vec::new(),
        };
        stat_headers.extend(stat_columns.iter().cloned());

        if cfg.median_stats {
            session_headers.extend(stat_columns.iter().cloned());
            session_headers.push("missing_stats".to_string());
        }

        if let Some(demographics) = &cfg.demographics {
            for fixed in ["Connect User ID", "Country", "State", "City"] {
                session_headers.push(fixed.to_string());
            }
            // BTreeMap keys, so attribute columns come out sorted.
            for attribute in demographics.attributes.keys() {
                session_headers.push(attribute.clone());
            }
        }

        for category in &cfg.script_categories {
            session_headers.push(category.title.clone());
        }

        if cfg.bluetooth {
            session_headers.push("Bluetooth Name".to_string());
            session_headers.push("Bluetooth Type".to_string());
        }

        let mut input_corpus_codes = Vec::new();
        if cfg.inputs {
            let prompts = db::prompts::list_input_prompts(pool, project_id).await?;
            let mut input_names: Vec<String> = Vec::new();
            for prompt in &prompts {
                if let Some(code) = prompt.corpus_code.as_deref() {
                    if !input_corpus_codes.iter().any(|c| c == code) {
                        input_corpus_codes.push(code.to_string());
                    }
                }
                for name in prompt.input_names() {
                    if !input_names.contains(&name) {
                        input_names.push(name);
                    }
                }
            }
            if input_names.is_empty() {
                warn!(project_id, "Input columns requested but no input prompts found");
            }
            input_names.sort();
            session_headers.extend(input_names);
        }

        for (_, name) in PHOTO_PROMPTS {
            push_photo_columns(&mut session_headers, name);
        }
        let image_codes = db::items::distinct_image_corpus_codes(pool, project_id).await?;
        let unmapped: Vec<&String> = image_codes
            .iter()
            .filter(|code| photo_prompt_name(code).is_none())
            .collect();
        if !unmapped.is_empty() {
            warn!(
                project_id,
                codes = ?unmapped,
                "Image corpus codes without a photo prompt mapping"
            );
            push_photo_columns(&mut session_headers, MISSING_PROMPT);
        }

        for attribute in &cfg.prompt_attributes {
            session_headers.push(attribute.clone());
        }

        Ok(Self {
            session_headers,
            stat_headers,
            stat_columns,
            input_corpus_codes,
        })
    }
}

fn push_photo_columns(headers: &mut Vec<String>, name: &str) {
    headers.push(format!("{}_photo_exif", name));
    headers.push(format!("{}_photo_url", name));
    headers.push(format!("{}_photo_lat", name));
    headers.push(format!("{}_photo_lng", name));
}
