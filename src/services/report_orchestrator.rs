//! Report orchestration
//!
//! One run end to end: resolve the project, build the header plan, load the
//! previous report as a cache, reconcile every session against it through a
//! bounded worker pool, write the workbook, upload it.
//!
//! Only this module touches the workbook tables; workers hand back finished
//! rows and results are appended in completion order.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{ReportConfig, Settings};
use crate::db::{self, projects::Project};
use crate::error::{Error, Result};
use crate::plan::ReportPlan;
use crate::report::{cache, Workbook};
use crate::services::cache_reconciler::{self, CacheDecision};
use crate::services::exif_extractor::ExifExtractor;
use crate::services::geoip_client::GeoIpClient;
use crate::services::rclone_uploader::RcloneUploader;
use crate::services::session_aggregator::{apply_substitutions, SessionAggregator};

/// What a finished run produced.
#[derive(Debug)]
pub struct ReportOutcome {
    pub report_path: PathBuf,
    pub sessions: usize,
    pub cache_hits: usize,
    pub recomputed: usize,
    pub stat_rows: usize,
    pub uploaded: bool,
}

pub struct ReportOrchestrator {
    pool: SqlitePool,
    settings: Arc<Settings>,
    cfg: Arc<ReportConfig>,
}

impl ReportOrchestrator {
    pub fn new(pool: SqlitePool, settings: Settings, cfg: ReportConfig) -> Self {
        Self {
            pool,
            settings: Arc::new(settings),
            cfg: Arc::new(cfg),
        }
    }

    pub async fn run(&self, project_id: i64) -> Result<ReportOutcome> {
        let run_id = Uuid::new_v4();

        let project = db::projects::fetch_project(&self.pool, project_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Project {} not found", project_id)))?;
        info!(run_id = %run_id, project = %project.name, "Starting report run");

        let plan = Arc::new(ReportPlan::build(&self.pool, project.id, &self.cfg).await?);

        let report_dir = PathBuf::from(&project.docs_path).join("TempReport");
        std::fs::create_dir_all(&report_dir)?;
        let report_path = report_dir.join(self.report_file_name(&project));

        let mut cached = if self.cfg.from_scratch {
            info!("Ignoring any previous report, recomputing every session");
            HashMap::new()
        } else {
            cache::load_cached_sessions(&report_path, &plan.session_headers)?
        };

        let geo = Arc::new(GeoIpClient::new(
            &self.settings.geoip_endpoint,
            Duration::from_millis(self.settings.geoip_min_interval_ms),
        )?);
        let exif = Arc::new(
            ExifExtractor::new(&self.settings.exif_tags)
                .map_err(|e| Error::Config(e.to_string()))?,
        );
        let aggregator = Arc::new(SessionAggregator::new(
            self.pool.clone(),
            Arc::clone(&plan),
            Arc::clone(&self.cfg),
            Arc::clone(&self.settings),
            geo,
            exif,
        ));

        let sessions = db::sessions::list_for_project(&self.pool, project.id).await?;
        let total_sessions = sessions.len();
        info!(
            sessions = total_sessions,
            cached = cached.len(),
            "Reconciling sessions against the previous report"
        );

        let mut tasks = Vec::with_capacity(sessions.len());
        for session in sessions {
            let entry = cached.remove(&session.name);
            let aggregator = Arc::clone(&aggregator);
            let cfg = Arc::clone(&self.cfg);
            let pool = self.pool.clone();

            tasks.push(async move {
                let live_count = db::items::count_for_session(&pool, session.id).await?;
                let decision =
                    cache_reconciler::decide(entry.as_ref(), session.finalized(), live_count);
                match (decision, entry) {
                    (CacheDecision::Hit, Some(entry)) => {
                        debug!(session = %session.name, "Cache hit");
                        let mut row = entry.row;
                        apply_substitutions(&mut row, &cfg.substitutions);
                        Ok::<_, Error>((row, entry.stats, true))
                    }
                    _ => {
                        let (row, stats) = aggregator.aggregate(&session).await?;
                        Ok((row, stats, false))
                    }
                }
            });
        }

        let mut workbook = Workbook::new(
            run_id,
            plan.session_headers.clone(),
            plan.stat_headers.clone(),
        );
        let mut cache_hits = 0;
        let mut recomputed = 0;
        let mut stat_count = 0;

        let workers = self.settings.workers.max(1);
        let mut results = stream::iter(tasks).buffer_unordered(workers);
        while let Some(result) = results.next().await {
            let (row, stats, hit) = result?;
            if hit {
                cache_hits += 1;
            } else {
                recomputed += 1;
            }
            workbook
                .sessions
                .rows
                .push(sanitize_cells(row.to_cells(&plan.session_headers)));
            for stat_row in stats {
                stat_count += 1;
                workbook
                    .stats
                    .rows
                    .push(sanitize_cells(stat_row.to_cells(&plan.stat_headers)));
            }
        }

        workbook.write(&report_path)?;
        info!(
            path = %report_path.display(),
            cache_hits,
            recomputed,
            stat_rows = stat_count,
            "Report written"
        );

        let mut uploaded = false;
        if self.cfg.no_upload {
            info!("Upload skipped");
        } else {
            let uploader =
                RcloneUploader::new(&self.settings.rclone_remote, &self.settings.upload_dir);
            uploader.upload(&report_path, &project.name).await?;
            uploaded = true;
        }

        Ok(ReportOutcome {
            report_path,
            sessions: total_sessions,
            cache_hits,
            recomputed,
            stat_rows: stat_count,
            uploaded,
        })
    }

    fn report_file_name(&self, project: &Project) -> String {
        match &self.cfg.report_name {
            Some(name) if name.ends_with(".json") => name.clone(),
            Some(name) => format!("{}.json", name),
            None => project.report_file_name(),
        }
    }
}

fn sanitize_cells(cells: Vec<Value>) -> Vec<Value> {
    cells.into_iter().map(sanitize_cell).collect()
}

/// Strip control characters from string cells before they reach the report.
fn sanitize_cell(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.chars().filter(|c| *c as u32 >= 32).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_strips_control_characters() {
        let cell = sanitize_cell(json!("line\u{0}one\ntwo\tthree"));
        assert_eq!(cell, json!("lineonetwothree"));
    }

    #[test]
    fn test_sanitize_leaves_other_cells_alone() {
        assert_eq!(sanitize_cell(json!(4.5)), json!(4.5));
        assert_eq!(sanitize_cell(Value::Null), Value::Null);
        assert_eq!(sanitize_cell(json!("clean")), json!("clean"));
    }
}
