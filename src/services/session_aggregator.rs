//! Session aggregation
//!
//! Builds one Sessions row plus any Stats rows for a single session, from
//! scratch. Steps run in a fixed order and later steps may overwrite cells
//! written by earlier ones (demographics overwrite the geolocated Country,
//! substitutions rewrite whatever is current, and so on).
//!
//! One aggregator is shared by all workers; it holds only read-only state
//! and the database pool.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::config::{CountryFormat, ReportConfig, Settings, Substitutions};
use crate::db::{self, identity::PinIdentity, items::ItemRecord, sessions::SessionRecord, stats::StatRecord};
use crate::error::{Error, Result};
use crate::models::ReportRow;
use crate::plan::{self, ReportPlan};
use crate::services::code_lookup;
use crate::services::exif_extractor::ExifExtractor;
use crate::services::geoip_client::{GeoIpClient, GeoMeta};
use crate::services::stat_validator;

/// Prompt types that count as recorded work.
const RECORDED_PROMPT_TYPES: &[&str] = &["recording", "video", "image"];

/// Per-session item statistics gathered in one pass.
#[derive(Debug, Default)]
struct ItemTally {
    recorded: i64,
    skipped: i64,
    rejected: i64,
    missing_stats: i64,
    /// Extracted stat values per schema column, for median mode.
    samples: HashMap<String, Vec<Value>>,
    stat_rows: Vec<ReportRow>,
}

pub struct SessionAggregator {
    pool: SqlitePool,
    plan: Arc<ReportPlan>,
    cfg: Arc<ReportConfig>,
    settings: Arc<Settings>,
    geo: Arc<GeoIpClient>,
    exif: Arc<ExifExtractor>,
}

impl SessionAggregator {
    pub fn new(
        pool: SqlitePool,
        plan: Arc<ReportPlan>,
        cfg: Arc<ReportConfig>,
        settings: Arc<Settings>,
        geo: Arc<GeoIpClient>,
        exif: Arc<ExifExtractor>,
    ) -> Self {
        Self {
            pool,
            plan,
            cfg,
            settings,
            geo,
            exif,
        }
    }

    /// Recompute one session's row and stat rows.
    pub async fn aggregate(
        &self,
        session: &SessionRecord,
    ) -> Result<(ReportRow, Vec<ReportRow>)> {
        debug!(session = %session.name, "Recomputing session");

        let items = db::items::list_for_session(&self.pool, session.id).await?;
        let identity = match session.pin_id {
            Some(pin_id) => db::identity::fetch_for_pin(&self.pool, pin_id).await?,
            None => None,
        };

        let mut row = ReportRow::new();
        row.set("Directory Name", session.name.clone());
        row.set("Date", session.created.to_rfc3339());
        row.set("Completed", session.completed);
        row.set("Abandoned", session.abandoned);
        if let Some(identity) = &identity {
            row.set("Pin", identity.pin.clone());
            set_opt(&mut row, "Email", identity.email.clone());
        }

        let mut stat_cache: HashMap<String, Option<StatRecord>> = HashMap::new();
        let tally = self
            .collect_item_stats(session, &items, &mut stat_cache)
            .await?;
        row.set("Total items", items.len() as i64);
        row.set("Recorded items", tally.recorded);
        row.set("Skipped items", tally.skipped);
        row.set("Rejected items", tally.rejected);

        let duration = self
            .session_duration(session, &items, &mut stat_cache)
            .await?;
        row.set("Duration", duration);

        self.apply_prompt_attributes(session, identity.as_ref(), &mut row)
            .await?;
        self.apply_median_stats(&tally, &mut row);
        self.apply_device_info(session, &mut row).await;
        self.apply_demographics(&mut row).await?;
        self.apply_inputs(&items, &mut row).await;
        self.apply_script_categories(identity.as_ref(), &mut row);
        apply_substitutions(&mut row, &self.cfg.substitutions);
        self.normalize_country(&mut row);
        self.apply_photos(&items, &mut row).await?;

        Ok((row, tally.stat_rows))
    }

    /// Step 1: counts, validation failures and median samples, one item pass.
    async fn collect_item_stats(
        &self,
        session: &SessionRecord,
        items: &[ItemRecord],
        stat_cache: &mut HashMap<String, Option<StatRecord>>,
    ) -> Result<ItemTally> {
        let mut tally = ItemTally::default();

        for item in items {
            if item.skipped() {
                tally.skipped += 1;
                continue;
            }
            let prompt_type = match item.prompt_type() {
                Some(t) if RECORDED_PROMPT_TYPES.contains(&t) => t,
                _ => continue,
            };
            tally.recorded += 1;

            let Some(schema) = &self.cfg.schema else {
                continue;
            };
            if let Some(code) = item.corpus_code() {
                if self.cfg.exclude_corpus_codes.iter().any(|c| c == &code) {
                    continue;
                }
            }

            let path = self.resolve_path(&item.path);
            let Some(stat) = latest_stat(&self.pool, &path, stat_cache).await? else {
                tally.missing_stats += 1;
                continue;
            };

            let reasons = schema.validate(&stat.data, prompt_type);
            if reasons.is_empty() && !self.cfg.median_stats {
                continue;
            }

            let mut stat_row = ReportRow::new();
            if !reasons.is_empty() {
                stat_row.set("Session", session.name.clone());
                stat_row.set("File", item.file_name());
                stat_row.set("Reason", reasons.join(","));
            }

            for column in &self.plan.stat_columns {
                let Some(value) =
                    stat_validator::extract_value(&stat.data, column, prompt_type)
                else {
                    continue;
                };
                if !reasons.is_empty() {
                    stat_row.set(column, value.clone());
                }
                if self.cfg.median_stats {
                    tally
                        .samples
                        .entry(column.clone())
                        .or_default()
                        .push(value.clone());
                }
            }

            if !reasons.is_empty() {
                tally.rejected += 1;
                tally.stat_rows.push(stat_row);
            }
        }

        Ok(tally)
    }

    /// Step 2: the session's own duration, or for video sessions the summed
    /// per-item durations from the stats pipeline.
    async fn session_duration(
        &self,
        session: &SessionRecord,
        items: &[ItemRecord],
        stat_cache: &mut HashMap<String, Option<StatRecord>>,
    ) -> Result<f64> {
        if let Some(duration) = session.duration {
            return Ok(duration);
        }

        let mut total = 0.0;
        for item in items {
            if item.prompt_type() != Some("video") {
                continue;
            }
            let path = self.resolve_path(&item.path);
            if let Some(stat) = latest_stat(&self.pool, &path, stat_cache).await? {
                if let Some(millis) = stat
                    .data
                    .pointer("/video/duration")
                    .and_then(Value::as_f64)
                {
                    total += millis / 1000.0;
                }
            }
        }
        Ok(total)
    }

    /// Step 4: copy requested prompt attributes, first prompt that carries a
    /// value wins, stop once every key is filled.
    async fn apply_prompt_attributes(
        &self,
        session: &SessionRecord,
        identity: Option<&PinIdentity>,
        row: &mut ReportRow,
    ) -> Result<()> {
        if self.cfg.prompt_attributes.is_empty() {
            return Ok(());
        }

        let script_id = identity.and_then(|i| i.script_id);
        let prompts =
            db::prompts::list_for_script(&self.pool, session.project_id, script_id).await?;

        for prompt in &prompts {
            let Some(attributes) = prompt.attributes.as_object() else {
                continue;
            };
            for key in &self.cfg.prompt_attributes {
                if matches!(row.get(key), Some(v) if !v.is_null()) {
                    continue;
                }
                if let Some(value) = attributes.get(key) {
                    if !value.is_null() {
                        row.set(key, value.clone());
                    }
                }
            }
            let all_filled = self
                .cfg
                .prompt_attributes
                .iter()
                .all(|key| matches!(row.get(key), Some(v) if !v.is_null()));
            if all_filled {
                break;
            }
        }
        Ok(())
    }

    /// Step 5 (median mode): per-column medians over the collected samples.
    fn apply_median_stats(&self, tally: &ItemTally, row: &mut ReportRow) {
        if !self.cfg.median_stats {
            return;
        }

        row.set("missing_stats", tally.missing_stats);
        for column in &self.plan.stat_columns {
            let numbers = match tally.samples.get(column) {
                Some(samples) => keep_numeric_samples(column, samples),
                None => Vec::new(),
            };
            if numbers.is_empty() {
                row.set(column, 0);
            } else {
                row.set(column, median(&numbers));
            }
        }
    }

    /// Step 6: flatten device info into same-named columns and geolocate the
    /// device IPs.
    async fn apply_device_info(&self, session: &SessionRecord, row: &mut ReportRow) {
        let Some(info) = session.device_info.as_ref().and_then(Value::as_object) else {
            return;
        };

        let ips = flatten_device_info(row, info);
        row.set("Device IP", ips.join(","));

        let mut meta: HashMap<String, GeoMeta> = HashMap::new();
        for ip in &ips {
            if !meta.contains_key(ip) {
                meta.insert(ip.clone(), self.geo.lookup(ip).await);
            }
        }

        row.set("Country", join_geo(&ips, &meta, |m| m.country.as_deref()));
        row.set(
            "Country Code",
            join_geo(&ips, &meta, |m| m.country_code.as_deref()),
        );
        row.set("Region", join_geo(&ips, &meta, |m| m.region.as_deref()));
        row.set(
            "Region Name",
            join_geo(&ips, &meta, |m| m.region_name.as_deref()),
        );
    }

    /// Step 7: demographic user lookup keyed by the numeric id inside the Pin.
    async fn apply_demographics(&self, row: &mut ReportRow) -> Result<()> {
        let Some(demographics) = &self.cfg.demographics else {
            return Ok(());
        };
        let Some(pin) = row.get_str("Pin") else {
            return Ok(());
        };
        let Some(found) = demographics.pattern.find(&pin) else {
            return Ok(());
        };
        let user_id: i64 = match found.as_str().parse() {
            Ok(id) => id,
            Err(_) => {
                warn!(pin = %pin, matched = %found.as_str(), "Pin match is not a numeric user id");
                return Ok(());
            }
        };
        let Some(user) = db::demographics::fetch_user(&self.pool, user_id).await? else {
            return Ok(());
        };

        row.set("Connect User ID", user.id);
        set_opt(row, "Country", user.country);
        set_opt(row, "State", user.state);
        set_opt(row, "City", user.city);
        set_opt(row, "Email", user.email);

        for (header, attribute_id) in &demographics.attributes {
            let value =
                db::demographics::fetch_attribute(&self.pool, user_id, *attribute_id).await?;
            match value {
                Some(v) => row.set(header, v),
                None => row.set(header, Value::Null),
            }
        }

        // Age normalization. "Age (ia)" takes precedence over "Age"; "Age"
        // is only parsed when "Age (ia)" is not a configured attribute at
        // all. age_bracket is parsed too but kept as a string so the
        // substitution table can map the number onto a bracket label.
        match row.get_str("Age (ia)") {
            Some(raw) if !raw.is_empty() => {
                row.set("Age (ia)", parse_age(&raw));
            }
            _ => {
                if !demographics.attributes.contains_key("Age (ia)") {
                    if let Some(raw) = row.get_str("Age").filter(|s| !s.is_empty()) {
                        row.set("Age", parse_age(&raw));
                    }
                }
            }
        }
        if let Some(raw) = row.get_str("age_bracket").filter(|s| !s.is_empty()) {
            let text = match parse_age(&raw) {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            row.set("age_bracket", text);
        }

        Ok(())
    }

    /// Step 8: free-text input answers plus language-code rewriting.
    async fn apply_inputs(&self, items: &[ItemRecord], row: &mut ReportRow) {
        if self.plan.input_corpus_codes.is_empty() {
            return;
        }

        for item in items {
            let Some(code) = item.corpus_code() else {
                continue;
            };
            if !self.plan.input_corpus_codes.iter().any(|c| c == &code) {
                continue;
            }

            let path = self.resolve_path(&item.path);
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    debug!(path = %path, error = %e, "Skipping unreadable input file");
                    continue;
                }
            };
            let entries: Vec<Value> = match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(path = %path, error = %e, "Skipping malformed input file");
                    continue;
                }
            };

            for entry in &entries {
                let Some(name) = entry.get("name").and_then(Value::as_str) else {
                    continue;
                };
                let Some(user_input) = entry.get("user_input") else {
                    continue;
                };
                if has_content(user_input) {
                    row.set(name, user_input.clone());
                }
            }
        }

        for field in &self.settings.language_fields {
            let Some(code) = row.get_str(field).filter(|s| !s.is_empty()) else {
                continue;
            };
            if let Some(name) = code_lookup::language_name(&code) {
                row.set(field, name);
            }
        }
    }

    /// Step 9: script-number driven category columns, first matching rule wins.
    fn apply_script_categories(&self, identity: Option<&PinIdentity>, row: &mut ReportRow) {
        if self.cfg.script_categories.is_empty() {
            return;
        }
        let Some(script_number) = identity.and_then(|i| i.script_number) else {
            return;
        };

        for category in &self.cfg.script_categories {
            for rule in &category.rules {
                if rule.matcher.matches(script_number) {
                    row.set(&category.title, rule.value.clone());
                    break;
                }
            }
        }
    }

    /// Step 11: rewrite the Country cell to the configured representation.
    fn normalize_country(&self, row: &mut ReportRow) {
        let Some(format) = self.cfg.countries else {
            return;
        };
        let Some(current) = row.get_str("Country").filter(|s| !s.is_empty()) else {
            return;
        };

        let country = code_lookup::country_by_alpha3(&current)
            .or_else(|| code_lookup::country_by_alpha2(&current))
            .or_else(|| code_lookup::country_by_name(&current));

        if let Some(country) = country {
            let formatted = match format {
                CountryFormat::Alpha2 => country.alpha2,
                CountryFormat::Alpha3 => country.alpha3,
                CountryFormat::FullName => country.name,
            };
            row.set("Country", formatted);
        }
    }

    /// Step 12: photo evidence columns, oldest photo first so a retaken
    /// photo under the same prompt wins.
    async fn apply_photos(&self, items: &[ItemRecord], row: &mut ReportRow) -> Result<()> {
        for item in items {
            if item.prompt_type() != Some("image") {
                continue;
            }

            let name = item
                .corpus_code()
                .and_then(plan::photo_prompt_name)
                .unwrap_or(plan::MISSING_PROMPT);
            let path = self.resolve_path(&item.path);
            let meta = self
                .exif
                .read_photo(Path::new(&path))
                .await
                .map_err(|e| {
                    Error::Report(format!(
                        "Photo metadata extraction failed for {}: {}",
                        path, e
                    ))
                })?;

            let (lat, lng) = match (meta.latitude, meta.longitude) {
                (Some(lat), Some(lng)) => (Some(lat), Some(lng)),
                _ => match item.device_location() {
                    Some((lat, lng)) => (Some(lat), Some(lng)),
                    None => (None, None),
                },
            };

            row.set(&format!("{}_photo_exif", name), serde_json::to_string(&meta.exif)?);
            row.set(&format!("{}_photo_url", name), meta.checksum.clone());
            row.set(&format!("{}_photo_lat", name), opt_value(lat));
            row.set(&format!("{}_photo_lng", name), opt_value(lng));
        }
        Ok(())
    }

    fn resolve_path(&self, path: &str) -> String {
        match &self.settings.storage_rewrite {
            Some(rewrite) => rewrite.apply(path),
            None => path.to_string(),
        }
    }
}

/// Fetch the latest stat for a path, at most once per session.
async fn latest_stat<'a>(
    pool: &SqlitePool,
    path: &str,
    cache: &'a mut HashMap<String, Option<StatRecord>>,
) -> Result<Option<&'a StatRecord>> {
    if !cache.contains_key(path) {
        let fetched = db::stats::latest_for_path(pool, path).await?;
        cache.insert(path.to_string(), fetched);
    }
    Ok(cache.get(path).and_then(|s| s.as_ref()))
}

/// Step 10: rewrite configured cells through the substitution table. Runs on
/// cache hits too, so it lives outside the aggregator.
pub fn apply_substitutions(row: &mut ReportRow, substitutions: &Substitutions) {
    for (column, table) in substitutions {
        let Some(current) = row.get_str(column) else {
            continue;
        };
        if let Some(replacement) = table.get(current.trim()) {
            row.set(column, replacement.clone());
        }
    }
}

/// Flatten device info keys into same-named cells; list values are
/// comma-joined. Returns the device IP list for geolocation.
fn flatten_device_info(
    row: &mut ReportRow,
    info: &serde_json::Map<String, Value>,
) -> Vec<String> {
    for (key, value) in info {
        match value {
            Value::Array(entries) => {
                let joined = entries
                    .iter()
                    .map(cell_string)
                    .collect::<Vec<_>>()
                    .join(",");
                row.set(key, joined);
            }
            other => row.set(key, other.clone()),
        }
    }

    info.get("ips")
        .and_then(Value::as_array)
        .map(|list| list.iter().map(cell_string).collect())
        .unwrap_or_default()
}

fn join_geo(
    ips: &[String],
    meta: &HashMap<String, GeoMeta>,
    field: impl Fn(&GeoMeta) -> Option<&str>,
) -> String {
    ips.iter()
        .map(|ip| meta.get(ip).and_then(|m| field(m)).unwrap_or("N/A"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Python-style truthiness for input answers: empty strings, zero, false,
/// null and empty containers are all considered blank.
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn cell_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn set_opt(row: &mut ReportRow, column: &str, value: Option<String>) {
    match value {
        Some(v) => row.set(column, v),
        None => row.set(column, Value::Null),
    }
}

fn opt_value(value: Option<f64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

/// Parse a birth date and return whole years as of today, or the unchanged
/// input wrapped in an "Unknown data format" marker.
fn parse_age(raw: &str) -> Value {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"] {
        if let Ok(born) = NaiveDate::parse_from_str(trimmed, format) {
            return Value::from(age_in_years(born, Utc::now().date_naive()));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Value::from(age_in_years(stamp.date(), Utc::now().date_naive()));
        }
    }
    Value::String(format!("Unknown data format: {}", raw))
}

fn age_in_years(born: NaiveDate, today: NaiveDate) -> i64 {
    let mut years = i64::from(today.year() - born.year());
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    years
}

/// Keep the numeric samples for one column; the stats pipeline's "NaN" and
/// "Infinity" markers are expected and dropped silently, anything else is
/// unrecognized output worth a warning.
fn keep_numeric_samples(column: &str, samples: &[Value]) -> Vec<f64> {
    let mut numbers = Vec::with_capacity(samples.len());
    for value in samples {
        if let Some(n) = value.as_f64() {
            numbers.push(n);
        } else if matches!(value.as_str(), Some("NaN") | Some("Infinity")) {
            continue;
        } else {
            warn!(column = %column, value = %value, "Unrecognized stat output");
        }
    }
    numbers
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_median_values() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[5.0]), 5.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[10.0, 20.0]), 15.0);
    }

    #[test]
    fn test_samples_drop_sentinels_and_junk() {
        let samples = vec![json!(10), json!("NaN"), json!(20), json!("bogus")];
        let numbers = keep_numeric_samples("snr", &samples);
        assert_eq!(numbers, vec![10.0, 20.0]);
        assert_eq!(median(&numbers), 15.0);
    }

    #[test]
    fn test_age_in_years_day_month_tie_break() {
        let born = NaiveDate::from_ymd_opt(2000, 8, 26).unwrap();
        let before_birthday = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let on_birthday = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();

        assert_eq!(age_in_years(born, before_birthday), 25);
        assert_eq!(age_in_years(born, on_birthday), 26);
    }

    #[test]
    fn test_parse_age_formats() {
        assert!(matches!(parse_age("1990-05-17"), Value::Number(_)));
        assert!(matches!(parse_age("17/05/1990"), Value::Number(_)));
        assert!(matches!(parse_age("1990-05-17T08:30:00"), Value::Number(_)));
        assert_eq!(
            parse_age("around 1990"),
            json!("Unknown data format: around 1990")
        );
    }

    #[test]
    fn test_apply_substitutions_trims_and_replaces() {
        let mut row = ReportRow::new();
        row.set("Gender", " m ");
        row.set("Country", "ZA");
        row.set("Empty", Value::Null);

        let mut table = HashMap::new();
        table.insert("m".to_string(), json!("Male"));
        let mut subs: Substitutions = HashMap::new();
        subs.insert("Gender".to_string(), table);
        subs.insert(
            "Missing".to_string(),
            HashMap::from([("x".to_string(), json!("y"))]),
        );
        subs.insert(
            "Empty".to_string(),
            HashMap::from([("null".to_string(), json!("set"))]),
        );

        apply_substitutions(&mut row, &subs);

        assert_eq!(row.get("Gender"), Some(&json!("Male")));
        assert_eq!(row.get("Country"), Some(&json!("ZA")));
        assert_eq!(row.get("Empty"), Some(&Value::Null));
        assert!(!row.contains("Missing"));
    }

    #[test]
    fn test_substitution_of_numeric_cell() {
        // A numeric cell substitutes through its display form.
        let mut row = ReportRow::new();
        row.set("age_bracket", 25);

        let mut subs: Substitutions = HashMap::new();
        subs.insert(
            "age_bracket".to_string(),
            HashMap::from([("25".to_string(), json!("18-29"))]),
        );

        apply_substitutions(&mut row, &subs);
        assert_eq!(row.get("age_bracket"), Some(&json!("18-29")));
    }

    #[test]
    fn test_flatten_device_info() {
        let mut row = ReportRow::new();
        let info = json!({
            "ips": ["10.0.0.1", "10.0.0.1", "8.8.8.8"],
            "Device ID": ["abc-123"],
            "Device OS": ["Android", "13"],
            "note": "plain"
        });

        let ips = flatten_device_info(&mut row, info.as_object().unwrap());

        assert_eq!(ips, vec!["10.0.0.1", "10.0.0.1", "8.8.8.8"]);
        assert_eq!(row.get_str("Device ID").as_deref(), Some("abc-123"));
        assert_eq!(row.get_str("Device OS").as_deref(), Some("Android,13"));
        assert_eq!(row.get_str("note").as_deref(), Some("plain"));
    }

    #[test]
    fn test_join_geo_degrades_to_na() {
        let ips = vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()];
        let mut meta = HashMap::new();
        meta.insert(
            "1.1.1.1".to_string(),
            GeoMeta {
                country: Some("South Africa".to_string()),
                ..GeoMeta::default()
            },
        );
        meta.insert("2.2.2.2".to_string(), GeoMeta::default());

        assert_eq!(
            join_geo(&ips, &meta, |m| m.country.as_deref()),
            "South Africa,N/A"
        );
    }

    #[test]
    fn test_input_truthiness() {
        assert!(has_content(&json!("yes")));
        assert!(has_content(&json!(3)));
        assert!(!has_content(&json!("")));
        assert!(!has_content(&json!(0)));
        assert!(!has_content(&Value::Null));
        assert!(!has_content(&json!([])));
    }
}
