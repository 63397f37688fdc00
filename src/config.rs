//! Configuration for collection-report
//!
//! Three layers, resolved once at startup:
//! - CLI arguments (clap) select the project and the per-run feature flags.
//! - A TOML settings file carries environment-level values (database URL,
//!   worker count, geolocation endpoint, upload remote).
//! - JSON config documents describe the project-specific rule sets
//!   (validation schema, demographics, script categories, substitutions).
//!
//! Rule-set expansion happens here, at load time, so the aggregation workers
//! only ever see well-formed rules.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::services::stat_validator::Schema;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "collection-report", about = "Generate a per-session collection report for a project")]
pub struct Args {
    /// Project id to report on
    pub project_id: i64,

    /// Path to the TOML settings file
    #[arg(long, env = "COLLECTION_REPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database URL override (otherwise taken from settings)
    #[arg(long, env = "COLLECTION_REPORT_DATABASE")]
    pub database: Option<String>,

    /// Path to the validation schema JSON document
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Path to the demographics JSON document (pin pattern + attribute map)
    #[arg(long)]
    pub demographics: Option<PathBuf>,

    /// Path to the script categories JSON document
    #[arg(long)]
    pub script_categories: Option<PathBuf>,

    /// Path to the cell substitutions JSON document
    #[arg(long)]
    pub substitutions: Option<PathBuf>,

    /// Corpus codes whose items are skipped during validation
    #[arg(long, value_delimiter = ',')]
    pub exclude_corpus_codes: Vec<String>,

    /// Prompt attribute keys to copy into the report
    #[arg(long, value_delimiter = ',')]
    pub prompt_attributes: Vec<String>,

    /// Collect free-text input answers into per-input columns
    #[arg(long)]
    pub inputs: bool,

    /// Add Bluetooth Name / Bluetooth Type columns from device info
    #[arg(long)]
    pub bluetooth: bool,

    /// Report per-column medians instead of per-item violation rows only
    #[arg(long)]
    pub median_stats: bool,

    /// Normalize the Country column to the given representation
    #[arg(long, value_enum)]
    pub countries: Option<CountryFormat>,

    /// Report file name override (extension appended when missing)
    #[arg(long)]
    pub report_name: Option<String>,

    /// Ignore the previous report and recompute every session
    #[arg(long)]
    pub from_scratch: bool,

    /// Skip the rclone upload after writing the report
    #[arg(long)]
    pub no_upload: bool,
}

/// Country column output representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CountryFormat {
    #[value(name = "alpha_2")]
    Alpha2,
    #[value(name = "alpha_3")]
    Alpha3,
    #[value(name = "full_name")]
    FullName,
}

/// Storage path prefix rewrite applied to item paths as they are read
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

impl PathRewrite {
    /// Apply the rewrite to a stored path; paths outside the prefix pass through.
    pub fn apply(&self, path: &str) -> String {
        match path.strip_prefix(&self.from) {
            Some(rest) => format!("{}{}", self.to, rest),
            None => path.to_string(),
        }
    }
}

/// TOML settings file contents
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Database URL (sqlite)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Concurrent session workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Geolocation endpoint, ip-api JSON shape
    #[serde(default = "default_geoip_endpoint")]
    pub geoip_endpoint: String,

    /// Minimum interval between geolocation requests
    #[serde(default = "default_geoip_min_interval_ms")]
    pub geoip_min_interval_ms: u64,

    /// Input columns holding alpha-3 language codes to rewrite as names
    #[serde(default = "default_language_fields")]
    pub language_fields: Vec<String>,

    /// EXIF tag names read from photo items
    #[serde(default = "default_exif_tags")]
    pub exif_tags: Vec<String>,

    /// Optional storage path prefix rewrite for item paths
    #[serde(default)]
    pub storage_rewrite: Option<PathRewrite>,

    /// rclone remote name for the report upload
    #[serde(default = "default_rclone_remote")]
    pub rclone_remote: String,

    /// Base directory on the remote; the project name is appended
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

fn default_database_url() -> String {
    "sqlite://collection.db".to_string()
}

fn default_workers() -> usize {
    6
}

fn default_geoip_endpoint() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_geoip_min_interval_ms() -> u64 {
    1400
}

fn default_language_fields() -> Vec<String> {
    vec![
        "First_Language".to_string(),
        "Primary_home_language".to_string(),
    ]
}

fn default_exif_tags() -> Vec<String> {
    crate::services::exif_extractor::DEFAULT_TAG_NAMES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_rclone_remote() -> String {
    "report".to_string()
}

fn default_upload_dir() -> String {
    "/Data Collection".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            workers: default_workers(),
            geoip_endpoint: default_geoip_endpoint(),
            geoip_min_interval_ms: default_geoip_min_interval_ms(),
            language_fields: default_language_fields(),
            exif_tags: default_exif_tags(),
            storage_rewrite: None,
            rclone_remote: default_rclone_remote(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file; a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("No settings file given, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            info!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read settings failed: {}", e)))?;
        let settings = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse settings failed: {}", e)))?;

        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }
}

/// Demographics lookup configuration: how to extract the numeric user id from
/// a pin, and which demographic attributes become report columns.
#[derive(Debug, Clone)]
pub struct Demographics {
    /// Pattern whose whole match is the numeric id inside the pin
    pub pattern: Regex,
    /// Column header -> attribute id, sorted by header
    pub attributes: BTreeMap<String, i64>,
}

#[derive(Debug, Deserialize)]
struct DemographicsDoc {
    pattern: String,
    #[serde(default)]
    attributes: BTreeMap<String, i64>,
}

/// One expanded script-category rule
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRule {
    pub matcher: RuleMatcher,
    pub value: Value,
}

/// What a script-category rule key matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMatcher {
    /// A single script number ("3")
    Exact(i64),
    /// An inclusive range of script numbers ("1-5")
    Range(i64, i64),
}

impl RuleMatcher {
    pub fn matches(&self, script_number: i64) -> bool {
        match *self {
            RuleMatcher::Exact(n) => script_number == n,
            RuleMatcher::Range(lo, hi) => (lo..=hi).contains(&script_number),
        }
    }
}

/// One script category: a report column plus its ordered rules
#[derive(Debug, Clone)]
pub struct ScriptCategory {
    pub title: String,
    pub rules: Vec<ScriptRule>,
}

#[derive(Debug, Deserialize)]
struct ScriptCategoryDoc {
    title: String,
    #[serde(deserialize_with = "ordered_map", default)]
    rules: Vec<(String, Value)>,
}

/// Deserialize a JSON object into a vector preserving document order.
///
/// Script rules are first-match-wins, so the order they appear in the config
/// file is significant and a plain map would lose it.
fn ordered_map<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, Value)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct OrderedMapVisitor;

    impl<'de> serde::de::Visitor<'de> for OrderedMapVisitor {
        type Value = Vec<(String, Value)>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a map of rule keys to values")
        }

        fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedMapVisitor)
}

/// Expand raw rule keys into matchers, dropping anything unparseable.
///
/// Accepted keys: a decimal script number ("3") or an inclusive range
/// ("1-5"). Anything else is warned about and removed so the workers never
/// see a malformed rule.
fn expand_rules(title: &str, raw: Vec<(String, Value)>) -> Vec<ScriptRule> {
    let mut rules = Vec::with_capacity(raw.len());

    for (key, value) in raw {
        let key = key.trim();
        let matcher = if let Ok(n) = key.parse::<i64>() {
            Some(RuleMatcher::Exact(n))
        } else if let Some((lo, hi)) = key.split_once('-') {
            match (lo.trim().parse::<i64>(), hi.trim().parse::<i64>()) {
                (Ok(lo), Ok(hi)) if lo <= hi => Some(RuleMatcher::Range(lo, hi)),
                _ => None,
            }
        } else {
            None
        };

        match matcher {
            Some(matcher) => rules.push(ScriptRule { matcher, value }),
            None => {
                warn!(category = %title, rule = %key, "Dropping unparseable script rule");
            }
        }
    }

    rules
}

/// Cell substitution table: column -> (current value as trimmed string -> replacement)
pub type Substitutions = HashMap<String, HashMap<String, Value>>;

/// Everything the run needs beyond the settings file: feature flags from the
/// CLI plus the loaded and expanded config documents.
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    pub schema: Option<Schema>,
    pub demographics: Option<Demographics>,
    pub script_categories: Vec<ScriptCategory>,
    pub substitutions: Substitutions,
    pub exclude_corpus_codes: Vec<String>,
    pub prompt_attributes: Vec<String>,
    pub inputs: bool,
    pub bluetooth: bool,
    pub median_stats: bool,
    pub countries: Option<CountryFormat>,
    pub report_name: Option<String>,
    pub from_scratch: bool,
    pub no_upload: bool,
}

impl ReportConfig {
    /// Load the config documents named on the command line.
    pub fn from_args(args: &Args) -> Result<Self> {
        let schema = args
            .schema
            .as_deref()
            .map(|p| read_json_document::<Schema>(p, "validation schema"))
            .transpose()?;

        let demographics = args
            .demographics
            .as_deref()
            .map(|p| {
                let doc: DemographicsDoc = read_json_document(p, "demographics config")?;
                let pattern = Regex::new(&doc.pattern).map_err(|e| {
                    Error::Config(format!("Invalid demographics pin pattern: {}", e))
                })?;
                Ok::<_, Error>(Demographics {
                    pattern,
                    attributes: doc.attributes,
                })
            })
            .transpose()?;

        let script_categories = args
            .script_categories
            .as_deref()
            .map(|p| {
                let docs: Vec<ScriptCategoryDoc> = read_json_document(p, "script categories")?;
                Ok::<_, Error>(
                    docs.into_iter()
                        .map(|doc| ScriptCategory {
                            rules: expand_rules(&doc.title, doc.rules),
                            title: doc.title,
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .transpose()?
            .unwrap_or_default();

        let substitutions = args
            .substitutions
            .as_deref()
            .map(|p| read_json_document::<Substitutions>(p, "substitutions"))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            schema,
            demographics,
            script_categories,
            substitutions,
            exclude_corpus_codes: args.exclude_corpus_codes.clone(),
            prompt_attributes: args.prompt_attributes.clone(),
            inputs: args.inputs,
            bluetooth: args.bluetooth,
            median_stats: args.median_stats,
            countries: args.countries,
            report_name: args.report_name.clone(),
            from_scratch: args.from_scratch,
            no_upload: args.no_upload,
        })
    }
}

/// Read and deserialize one JSON config document.
fn read_json_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", what, e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expand_rules_exact_and_range() {
        let raw = vec![
            ("3".to_string(), json!("scripted")),
            ("1-5".to_string(), json!("open")),
        ];

        let rules = expand_rules("Category", raw);

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].matcher, RuleMatcher::Exact(3));
        assert!(rules[0].matcher.matches(3));
        assert!(!rules[0].matcher.matches(4));
        assert_eq!(rules[1].matcher, RuleMatcher::Range(1, 5));
        assert!(rules[1].matcher.matches(1));
        assert!(rules[1].matcher.matches(5));
        assert!(!rules[1].matcher.matches(6));
    }

    #[test]
    fn test_expand_rules_drops_garbage() {
        let raw = vec![
            ("bogus".to_string(), json!("x")),
            ("5-1".to_string(), json!("y")),
            ("7".to_string(), json!("z")),
        ];

        let rules = expand_rules("Category", raw);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].matcher, RuleMatcher::Exact(7));
    }

    #[test]
    fn test_script_category_doc_preserves_rule_order() {
        let doc: ScriptCategoryDoc = serde_json::from_str(
            r#"{"title": "Kind", "rules": {"9": "late", "1-10": "any", "2": "never reached"}}"#,
        )
        .unwrap();

        let keys: Vec<&str> = doc.rules.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["9", "1-10", "2"]);
    }

    #[test]
    fn test_settings_defaults() {
        let settings: Settings = toml::from_str("").unwrap();

        assert_eq!(settings.workers, 6);
        assert_eq!(settings.rclone_remote, "report");
        assert!(settings.storage_rewrite.is_none());
        assert!(settings.exif_tags.iter().any(|t| t == "GPSLatitude"));
        assert_eq!(
            settings.language_fields,
            vec!["First_Language".to_string(), "Primary_home_language".to_string()]
        );
    }

    #[test]
    fn test_settings_storage_rewrite() {
        let settings: Settings = toml::from_str(
            r#"
            workers = 2

            [storage_rewrite]
            from = "/old-mount/"
            to = "/new-mount/"
            "#,
        )
        .unwrap();

        assert_eq!(settings.workers, 2);
        let rewrite = settings.storage_rewrite.unwrap();
        assert_eq!(rewrite.apply("/old-mount/a/b.wav"), "/new-mount/a/b.wav");
        assert_eq!(rewrite.apply("/other/a.wav"), "/other/a.wav");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "collection-report",
            "42",
            "--median-stats",
            "--exclude-corpus-codes",
            "intro1,intro2",
            "--countries",
            "alpha_2",
        ])
        .unwrap();

        assert_eq!(args.project_id, 42);
        assert!(args.median_stats);
        assert_eq!(args.exclude_corpus_codes, vec!["intro1", "intro2"]);
        assert_eq!(args.countries, Some(CountryFormat::Alpha2));
    }
}
