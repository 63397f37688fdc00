//! Data models for collection-report

pub mod cache;
pub mod row;

pub use cache::CachedSession;
pub use row::ReportRow;
