//! collection-report - Per-session collection report generator
//!
//! Command-line entry point: parse arguments, load settings and the project
//! rule documents, connect to the collection database, hand off to the
//! orchestrator, and print the run summary.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use collection_report::config::{Args, ReportConfig, Settings};
use collection_report::db;
use collection_report::services::report_orchestrator::ReportOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting collection-report v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;
    let cfg = ReportConfig::from_args(&args)?;

    let database_url = args
        .database
        .clone()
        .unwrap_or_else(|| settings.database_url.clone());
    let pool = match db::connect(&database_url).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let orchestrator = ReportOrchestrator::new(pool, settings, cfg);
    let outcome = orchestrator.run(args.project_id).await?;

    info!(
        "✓ Report complete: {} sessions ({} cached, {} recomputed), {} stat rows -> {}{}",
        outcome.sessions,
        outcome.cache_hits,
        outcome.recomputed,
        outcome.stat_rows,
        outcome.report_path.display(),
        if outcome.uploaded { " (uploaded)" } else { "" }
    );

    Ok(())
}
