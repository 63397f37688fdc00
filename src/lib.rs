//! collection-report - Session quality report generator
//!
//! Reads a crowdsourced-collection database and produces one JSON workbook
//! per project: a Sessions table with one row per collection session and a
//! Stats table with one row per flagged item. Runs are incremental; sessions
//! already finalized in the previous report are carried forward instead of
//! recomputed.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod plan;
pub mod report;
pub mod services;

pub use error::{Error, Result};
