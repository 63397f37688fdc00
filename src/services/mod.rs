//! Report pipeline services
//!
//! The orchestrator drives a run; the aggregator computes one session's
//! rows; the rest are the collaborators it leans on (cache decisions,
//! quality-stat validation, GeoIP, EXIF, static code tables, upload).

pub mod cache_reconciler;
pub mod code_lookup;
pub mod exif_extractor;
pub mod geoip_client;
pub mod rclone_uploader;
pub mod report_orchestrator;
pub mod session_aggregator;
pub mod stat_validator;
