//! Report row model
//!
//! A row is a bag of name-keyed cells. Column order is decided only at
//! emission time, by projecting the row against the run's header plan, so
//! aggregation steps can fill cells in any order and overwrite freely.

use std::collections::HashMap;

use serde_json::Value;

/// One report row (a Sessions row or a Stats row)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRow {
    cells: HashMap<String, Value>,
}

impl ReportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell, overwriting any earlier value.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.cells.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// The cell as a display string, if present and non-null.
    pub fn get_str(&self, column: &str) -> Option<String> {
        match self.cells.get(column)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// True when every cell is null (or the row is empty).
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.is_null())
    }

    /// Rebuild a row from a stored header row and its cells.
    ///
    /// Extra cells beyond the headers are dropped; null cells are kept so a
    /// reloaded row projects back to exactly what was stored.
    pub fn from_cells(headers: &[String], cells: &[Value]) -> Self {
        let mut row = Self::new();
        for (header, cell) in headers.iter().zip(cells.iter()) {
            row.cells.insert(header.clone(), cell.clone());
        }
        row
    }

    /// Project the row onto a header list; missing columns emit null.
    pub fn to_cells(&self, headers: &[String]) -> Vec<Value> {
        headers
            .iter()
            .map(|h| self.cells.get(h).cloned().unwrap_or(Value::Null))
            .collect()
    }
}
