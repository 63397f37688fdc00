//! Report workbook
//!
//! The report artifact is a JSON document with two named tables, Sessions
//! and Stats, each a header row plus data rows. The stored header rows are
//! the compatibility contract the next run checks before reusing anything.

pub mod cache;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// One report table: an ordered header row plus data rows.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }
}

/// The report workbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbook {
    /// Tool name and version that wrote the file
    pub generator: String,
    /// Run identity, also threaded through the logs
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "Sessions")]
    pub sessions: Table,
    #[serde(rename = "Stats")]
    pub stats: Table,
}

impl Workbook {
    pub fn new(run_id: Uuid, session_headers: Vec<String>, stat_headers: Vec<String>) -> Self {
        Self {
            generator: format!("collection-report {}", env!("CARGO_PKG_VERSION")),
            run_id,
            generated_at: Utc::now(),
            sessions: Table::new(session_headers),
            stats: Table::new(stat_headers),
        }
    }

    /// Read a workbook from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let workbook = serde_json::from_str(&content)?;
        Ok(workbook)
    }

    /// Write the workbook to disk.
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Preserve a report file as `<path>.bak` before it is discarded.
pub fn backup_file(path: &Path) -> Result<PathBuf> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let backup = PathBuf::from(backup);

    std::fs::copy(path, &backup)?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workbook_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut workbook = Workbook::new(
            Uuid::new_v4(),
            vec!["Directory Name".to_string(), "Total items".to_string()],
            vec!["Session".to_string(), "File".to_string(), "Reason".to_string()],
        );
        workbook.sessions.rows.push(vec![json!("sess_01"), json!(4)]);
        workbook.write(&path).unwrap();

        let reread = Workbook::read(&path).unwrap();
        assert_eq!(reread.sessions, workbook.sessions);
        assert_eq!(reread.stats.headers.len(), 3);
        assert_eq!(reread.run_id, workbook.run_id);
    }

    #[test]
    fn test_backup_file_appends_bak() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, "{}").unwrap();

        let backup = backup_file(&path).unwrap();

        assert_eq!(backup, dir.path().join("report.json.bak"));
        assert!(backup.exists());
        assert!(path.exists());
    }
}
