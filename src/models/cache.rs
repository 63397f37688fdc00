//! Cached session model
//!
//! One entry per session found in the previous report: the stored Sessions
//! row plus any Stats rows that referenced it. The flags read out of the
//! stored row drive the hit/miss decision.

use serde_json::Value;

use crate::models::ReportRow;

/// A session as recovered from the previous report
#[derive(Debug, Clone, Default)]
pub struct CachedSession {
    /// The stored Sessions row
    pub row: ReportRow,
    /// Stats rows that named this session
    pub stats: Vec<ReportRow>,
}

impl CachedSession {
    pub fn new(row: ReportRow) -> Self {
        Self {
            row,
            stats: Vec::new(),
        }
    }

    pub fn completed(&self) -> bool {
        truthy(self.row.get("Completed"))
    }

    pub fn abandoned(&self) -> bool {
        truthy(self.row.get("Abandoned"))
    }

    /// The stored item count, when it parses as a whole number.
    pub fn total_items(&self) -> Option<i64> {
        match self.row.get("Total items")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Lenient boolean read: stored cells may be real booleans or strings,
/// depending on what wrote the file and what substitutions did to it.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}
