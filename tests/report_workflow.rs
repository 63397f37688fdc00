//! End-to-end report workflow tests
//!
//! Each test drives the orchestrator against a file-backed SQLite database
//! in a temporary directory, then inspects the written workbook and the run
//! outcome. Uploads are disabled throughout; nothing here needs the network.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use regex::Regex;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use collection_report::config::{CountryFormat, Demographics, ReportConfig, Settings};
use collection_report::report::Workbook;
use collection_report::services::report_orchestrator::ReportOrchestrator;

/// Create a temp dir with a seeded database file and a docs directory.
async fn setup() -> (TempDir, SqlitePool, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("collection.db");
    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display()))
        .await
        .expect("Failed to open test database");

    sqlx::query(
        r#"
        CREATE TABLE projects (
            id INTEGER PRIMARY KEY,
            number TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            lang_code TEXT NOT NULL,
            docs_path TEXT NOT NULL
        );

        CREATE TABLE sessions (
            id INTEGER PRIMARY KEY,
            project_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            pin_id INTEGER,
            created TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            abandoned INTEGER NOT NULL DEFAULT 0,
            duration REAL,
            device_info TEXT
        );

        CREATE TABLE items (
            id INTEGER PRIMARY KEY,
            session_id INTEGER NOT NULL,
            path TEXT NOT NULL,
            created TEXT NOT NULL,
            attributes TEXT NOT NULL
        );

        CREATE TABLE stats (
            id INTEGER PRIMARY KEY,
            item_path TEXT NOT NULL,
            created TEXT NOT NULL,
            data TEXT NOT NULL
        );

        CREATE TABLE pins (
            id INTEGER PRIMARY KEY,
            pin TEXT NOT NULL,
            user_id INTEGER,
            script_id INTEGER
        );

        CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT);
        CREATE TABLE scripts (id INTEGER PRIMARY KEY, number INTEGER);

        CREATE TABLE prompts (
            id INTEGER PRIMARY KEY,
            project_id INTEGER NOT NULL,
            script_id INTEGER,
            prompt_type TEXT NOT NULL,
            corpus_code TEXT,
            attributes TEXT,
            inputs TEXT,
            position INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE connect_users (
            id INTEGER PRIMARY KEY,
            email TEXT,
            country TEXT,
            state TEXT,
            city TEXT
        );

        CREATE TABLE connect_user_attributes (
            user_id INTEGER NOT NULL,
            attribute_id INTEGER NOT NULL,
            value TEXT
        );
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create test schema");

    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).expect("Failed to create docs dir");
    sqlx::query(
        "INSERT INTO projects (id, number, name, description, lang_code, docs_path)
         VALUES (1, 'P017', 'drive', 'in_car', 'af-ZA', ?)",
    )
    .bind(docs.display().to_string())
    .execute(&pool)
    .await
    .expect("Failed to seed project");

    (dir, pool, docs)
}

fn settings() -> Settings {
    Settings {
        workers: 2,
        ..Settings::default()
    }
}

fn config() -> ReportConfig {
    ReportConfig {
        schema: None,
        demographics: None,
        script_categories: Vec::new(),
        substitutions: HashMap::new(),
        exclude_corpus_codes: Vec::new(),
        prompt_attributes: Vec::new(),
        inputs: false,
        bluetooth: false,
        median_stats: false,
        countries: None,
        report_name: None,
        from_scratch: false,
        no_upload: true,
    }
}

async fn insert_session(pool: &SqlitePool, id: i64, name: &str, completed: bool) {
    sqlx::query(
        "INSERT INTO sessions (id, project_id, name, pin_id, created, completed, abandoned, duration)
         VALUES (?, 1, ?, NULL, ?, ?, 0, 120.5)",
    )
    .bind(id)
    .bind(name)
    .bind(format!("2026-08-{:02}T10:00:00Z", id))
    .bind(completed as i64)
    .execute(pool)
    .await
    .expect("Failed to seed session");
}

async fn insert_item(pool: &SqlitePool, id: i64, session_id: i64, path: &str, attributes: Value) {
    sqlx::query(
        "INSERT INTO items (id, session_id, path, created, attributes) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(session_id)
    .bind(path)
    .bind(format!("2026-08-01T10:{:02}:00Z", id))
    .bind(attributes.to_string())
    .execute(pool)
    .await
    .expect("Failed to seed item");
}

async fn insert_stat(pool: &SqlitePool, item_path: &str, data: Value) {
    sqlx::query(
        "INSERT INTO stats (item_path, created, data) VALUES (?, '2026-08-01T12:00:00Z', ?)",
    )
    .bind(item_path)
    .bind(data.to_string())
    .execute(pool)
    .await
    .expect("Failed to seed stat");
}

fn header_index(headers: &[String], name: &str) -> usize {
    headers
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("Header {:?} not in {:?}", name, headers))
}

/// Find a Sessions row by directory name and read one of its cells.
fn session_cell<'a>(workbook: &'a Workbook, session: &str, column: &str) -> &'a Value {
    let name_idx = header_index(&workbook.sessions.headers, "Directory Name");
    let col_idx = header_index(&workbook.sessions.headers, column);
    let row = workbook
        .sessions
        .rows
        .iter()
        .find(|row| row[name_idx] == json!(session))
        .unwrap_or_else(|| panic!("No row for session {:?}", session));
    &row[col_idx]
}

#[tokio::test]
async fn test_fresh_run_writes_report_with_counts() {
    let (_dir, pool, docs) = setup().await;
    insert_session(&pool, 1, "sess_01", true).await;
    insert_item(&pool, 1, 1, "/storage/sess_01/a.wav", json!({"prompttype": "recording"})).await;
    insert_item(&pool, 2, 1, "/storage/sess_01/b.wav", json!({"prompttype": "recording"})).await;
    insert_session(&pool, 2, "sess_02", false).await;
    insert_item(
        &pool,
        3,
        2,
        "/storage/sess_02/a.wav",
        json!({"prompttype": "recording", "skipped": "true"}),
    )
    .await;

    let orchestrator = ReportOrchestrator::new(pool, settings(), config());
    let outcome = orchestrator.run(1).await.expect("Run failed");

    assert_eq!(outcome.sessions, 2);
    assert_eq!(outcome.recomputed, 2);
    assert_eq!(outcome.cache_hits, 0);
    assert_eq!(outcome.stat_rows, 0);
    assert!(!outcome.uploaded);

    let expected_path = docs
        .join("TempReport")
        .join("P017_drive_in_car_af-ZA_collection_report.json");
    assert_eq!(outcome.report_path, expected_path);
    assert!(expected_path.exists());

    let workbook = Workbook::read(&expected_path).expect("Report unreadable");
    assert_eq!(workbook.sessions.rows.len(), 2);
    assert_eq!(workbook.sessions.headers[0], "Directory Name");
    // Photo columns are part of the base layout.
    assert!(workbook
        .sessions
        .headers
        .iter()
        .any(|h| h == "ev_station_photo_exif"));

    assert_eq!(session_cell(&workbook, "sess_01", "Total items"), &json!(2));
    assert_eq!(session_cell(&workbook, "sess_01", "Recorded items"), &json!(2));
    assert_eq!(session_cell(&workbook, "sess_01", "Completed"), &json!(true));
    assert_eq!(session_cell(&workbook, "sess_01", "Duration"), &json!(120.5));
    assert_eq!(session_cell(&workbook, "sess_02", "Skipped items"), &json!(1));
    assert_eq!(session_cell(&workbook, "sess_02", "Recorded items"), &json!(0));
}

#[tokio::test]
async fn test_second_run_reuses_settled_sessions() {
    let (_dir, pool, _docs) = setup().await;
    insert_session(&pool, 1, "sess_01", true).await;
    insert_item(&pool, 1, 1, "/storage/sess_01/a.wav", json!({"prompttype": "recording"})).await;
    insert_session(&pool, 2, "sess_02", false).await;
    insert_item(&pool, 2, 2, "/storage/sess_02/a.wav", json!({"prompttype": "recording"})).await;

    let orchestrator = ReportOrchestrator::new(pool.clone(), settings(), config());
    let first = orchestrator.run(1).await.expect("First run failed");
    assert_eq!(first.recomputed, 2);

    // Nothing changed: the finalized session and the stable open session
    // both come out of the cache.
    let second = orchestrator.run(1).await.expect("Second run failed");
    assert_eq!(second.cache_hits, 2);
    assert_eq!(second.recomputed, 0);

    // A new item on the open session invalidates only that session.
    insert_item(&pool, 3, 2, "/storage/sess_02/b.wav", json!({"prompttype": "recording"})).await;
    let third = orchestrator.run(1).await.expect("Third run failed");
    assert_eq!(third.cache_hits, 1);
    assert_eq!(third.recomputed, 1);

    let workbook = Workbook::read(&third.report_path).expect("Report unreadable");
    assert_eq!(session_cell(&workbook, "sess_02", "Total items"), &json!(2));
}

#[tokio::test]
async fn test_finalizing_a_session_forces_recompute() {
    let (_dir, pool, _docs) = setup().await;
    insert_session(&pool, 1, "sess_01", false).await;
    insert_item(&pool, 1, 1, "/storage/sess_01/a.wav", json!({"prompttype": "recording"})).await;

    let orchestrator = ReportOrchestrator::new(pool.clone(), settings(), config());
    orchestrator.run(1).await.expect("First run failed");

    sqlx::query("UPDATE sessions SET completed = 1 WHERE id = 1")
        .execute(&pool)
        .await
        .expect("Failed to finalize session");

    // The cached row still says open, so the transition recomputes even
    // though the item count is unchanged.
    let second = orchestrator.run(1).await.expect("Second run failed");
    assert_eq!(second.cache_hits, 0);
    assert_eq!(second.recomputed, 1);

    let workbook = Workbook::read(&second.report_path).expect("Report unreadable");
    assert_eq!(session_cell(&workbook, "sess_01", "Completed"), &json!(true));
}

#[tokio::test]
async fn test_changed_columns_invalidate_previous_report() {
    let (_dir, pool, _docs) = setup().await;
    insert_session(&pool, 1, "sess_01", true).await;

    let first = ReportOrchestrator::new(pool.clone(), settings(), config())
        .run(1)
        .await
        .expect("First run failed");
    assert_eq!(first.recomputed, 1);

    let mut bluetooth_cfg = config();
    bluetooth_cfg.bluetooth = true;
    let second = ReportOrchestrator::new(pool, settings(), bluetooth_cfg)
        .run(1)
        .await
        .expect("Second run failed");

    assert_eq!(second.cache_hits, 0);
    assert_eq!(second.recomputed, 1);
    let backup = first.report_path.with_extension("json.bak");
    assert!(backup.exists(), "Expected drifted report at {:?}", backup);
}

#[tokio::test]
async fn test_from_scratch_recomputes_everything() {
    let (_dir, pool, _docs) = setup().await;
    insert_session(&pool, 1, "sess_01", true).await;

    ReportOrchestrator::new(pool.clone(), settings(), config())
        .run(1)
        .await
        .expect("First run failed");

    let mut scratch_cfg = config();
    scratch_cfg.from_scratch = true;
    let second = ReportOrchestrator::new(pool, settings(), scratch_cfg)
        .run(1)
        .await
        .expect("Second run failed");

    assert_eq!(second.cache_hits, 0);
    assert_eq!(second.recomputed, 1);
}

#[tokio::test]
async fn test_schema_violations_emit_stat_rows() {
    let (_dir, pool, _docs) = setup().await;
    insert_session(&pool, 1, "sess_01", true).await;
    insert_item(&pool, 1, 1, "/storage/sess_01/a.wav", json!({"prompttype": "recording"})).await;
    insert_item(&pool, 2, 1, "/storage/sess_01/b.wav", json!({"prompttype": "recording"})).await;
    insert_item(&pool, 3, 1, "/storage/sess_01/c.wav", json!({"prompttype": "recording"})).await;
    insert_stat(&pool, "/storage/sess_01/a.wav", json!({"clipping": 0.9, "snr": 30.0})).await;
    insert_stat(&pool, "/storage/sess_01/b.wav", json!({"clipping": 0.1, "snr": 20.0})).await;
    // c.wav has no stat at all.

    let mut cfg = config();
    cfg.schema = Some(
        serde_json::from_value(json!({
            "properties": {
                "clipping": {"type": "number", "maximum": 0.2},
                "snr": {"type": "number", "minimum": 10.0}
            },
            "required": ["snr"]
        }))
        .expect("Bad schema document"),
    );

    let orchestrator = ReportOrchestrator::new(pool, settings(), cfg);
    let outcome = orchestrator.run(1).await.expect("Run failed");
    assert_eq!(outcome.stat_rows, 1);

    let workbook = Workbook::read(&outcome.report_path).expect("Report unreadable");
    assert_eq!(
        workbook.stats.headers,
        vec!["Session", "File", "Reason", "clipping", "snr"]
    );
    assert_eq!(workbook.stats.rows.len(), 1);
    let row = &workbook.stats.rows[0];
    assert_eq!(row[0], json!("sess_01"));
    assert_eq!(row[1], json!("a.wav"));
    assert_eq!(row[2], json!("clipping = 0.9 above maximum 0.2"));
    assert_eq!(row[3], json!(0.9));

    assert_eq!(session_cell(&workbook, "sess_01", "Rejected items"), &json!(1));
    assert_eq!(session_cell(&workbook, "sess_01", "Recorded items"), &json!(3));

    // A cache hit carries the stored stat rows forward.
    let second = orchestrator.run(1).await.expect("Second run failed");
    assert_eq!(second.cache_hits, 1);
    assert_eq!(second.stat_rows, 1);
}

#[tokio::test]
async fn test_demographics_substitutions_and_country_format() {
    let (_dir, pool, _docs) = setup().await;

    sqlx::query("INSERT INTO pins (id, pin, user_id, script_id) VALUES (5, 'za_12345_a', NULL, NULL)")
        .execute(&pool)
        .await
        .expect("Failed to seed pin");
    sqlx::query(
        "INSERT INTO sessions (id, project_id, name, pin_id, created, completed, abandoned, duration)
         VALUES (1, 1, 'sess_01', 5, '2026-08-01T10:00:00Z', 1, 0, 60.0)",
    )
    .execute(&pool)
    .await
    .expect("Failed to seed session");
    sqlx::query(
        "INSERT INTO connect_users (id, email, country, state, city)
         VALUES (12345, 'user@example.com', 'ZAF', 'Western Cape', 'Cape Town')",
    )
    .execute(&pool)
    .await
    .expect("Failed to seed demographic user");
    sqlx::query(
        "INSERT INTO connect_user_attributes (user_id, attribute_id, value) VALUES (12345, 7, 'm')",
    )
    .execute(&pool)
    .await
    .expect("Failed to seed demographic attribute");

    let mut cfg = config();
    cfg.demographics = Some(Demographics {
        pattern: Regex::new("[0-9]+").unwrap(),
        attributes: BTreeMap::from([("Gender".to_string(), 7)]),
    });
    cfg.substitutions = HashMap::from([(
        "Gender".to_string(),
        HashMap::from([("m".to_string(), json!("Male"))]),
    )]);
    cfg.countries = Some(CountryFormat::FullName);

    let orchestrator = ReportOrchestrator::new(pool, settings(), cfg);
    let outcome = orchestrator.run(1).await.expect("Run failed");

    let workbook = Workbook::read(&outcome.report_path).expect("Report unreadable");
    assert_eq!(session_cell(&workbook, "sess_01", "Pin"), &json!("za_12345_a"));
    assert_eq!(
        session_cell(&workbook, "sess_01", "Connect User ID"),
        &json!(12345)
    );
    // Demographic country, then normalized to the full name.
    assert_eq!(
        session_cell(&workbook, "sess_01", "Country"),
        &json!("South Africa")
    );
    assert_eq!(
        session_cell(&workbook, "sess_01", "State"),
        &json!("Western Cape")
    );
    assert_eq!(session_cell(&workbook, "sess_01", "Gender"), &json!("Male"));
    assert_eq!(
        session_cell(&workbook, "sess_01", "Email"),
        &json!("user@example.com")
    );
}

#[tokio::test]
async fn test_report_name_override_appends_extension() {
    let (_dir, pool, docs) = setup().await;

    let mut cfg = config();
    cfg.report_name = Some("weekly".to_string());
    let outcome = ReportOrchestrator::new(pool, settings(), cfg)
        .run(1)
        .await
        .expect("Run failed");

    assert_eq!(
        outcome.report_path,
        docs.join("TempReport").join("weekly.json")
    );
    assert!(outcome.report_path.exists());
    assert_eq!(outcome.sessions, 0);
}

#[tokio::test]
async fn test_unknown_project_fails() {
    let (_dir, pool, _docs) = setup().await;

    let err = ReportOrchestrator::new(pool, settings(), config())
        .run(99)
        .await
        .expect_err("Run should fail for an unknown project");
    assert!(err.to_string().contains("Project 99 not found"));
}
