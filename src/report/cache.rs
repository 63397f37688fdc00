//! Previous-report cache loader
//!
//! Rebuilds the session cache from the previous report file. The cache is
//! disposable: a missing file is a cold start, and a file whose Sessions
//! header set no longer matches the current plan is backed up and ignored
//! rather than partially trusted.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{CachedSession, ReportRow};
use crate::report::{backup_file, Workbook};

/// Load the cached sessions from the previous report, keyed by directory
/// name. Returns an empty map whenever the file cannot be trusted.
pub fn load_cached_sessions(
    path: &Path,
    session_headers: &[String],
) -> Result<HashMap<String, CachedSession>> {
    if !path.exists() {
        info!(path = %path.display(), "No previous report, starting cold");
        return Ok(HashMap::new());
    }

    let workbook = match Workbook::read(path) {
        Ok(workbook) => workbook,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Previous report unreadable, ignoring it");
            let backup = backup_file(path)?;
            info!(backup = %backup.display(), "Previous report preserved");
            return Ok(HashMap::new());
        }
    };

    let stored: HashSet<&str> = workbook.sessions.headers.iter().map(String::as_str).collect();
    let expected: HashSet<&str> = session_headers.iter().map(String::as_str).collect();
    if stored != expected {
        warn!(
            path = %path.display(),
            "Previous report columns do not match the current configuration, recomputing everything"
        );
        let backup = backup_file(path)?;
        info!(backup = %backup.display(), "Previous report preserved");
        return Ok(HashMap::new());
    }

    let mut cache: HashMap<String, CachedSession> = HashMap::new();
    for cells in &workbook.sessions.rows {
        let row = ReportRow::from_cells(&workbook.sessions.headers, cells);
        if row.is_blank() {
            continue;
        }
        let Some(name) = row.get_str("Directory Name") else {
            debug!("Skipping cached row without a directory name");
            continue;
        };
        cache.insert(name, CachedSession::new(row));
    }

    if cache.is_empty() {
        return Ok(cache);
    }

    // The Stats table is read against its own stored header row; rows naming
    // sessions that are no longer cached are dropped.
    for cells in &workbook.stats.rows {
        let row = ReportRow::from_cells(&workbook.stats.headers, cells);
        if row.is_blank() {
            continue;
        }
        let Some(session) = row.get_str("Session") else {
            continue;
        };
        if let Some(entry) = cache.get_mut(&session) {
            entry.stats.push(row);
        }
    }

    info!(sessions = cache.len(), path = %path.display(), "Loaded previous report");
    Ok(cache)
}
