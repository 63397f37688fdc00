//! Stat validation against the project's schema document
//!
//! The schema is a small JSON-schema subset: top-level properties with
//! optional type / minimum / maximum / enum checks, plus one nesting level
//! for the "video", "audio" and "image" groups. Column names derive from it
//! (nested groups become "group/field"), and values are extracted from stat
//! documents with prompt-type awareness: plain fields belong to recordings,
//! nested groups to the matching prompt type, and video stats also expose
//! their "audio" group.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Group names that nest one level deep in stat documents
const NESTED_GROUPS: [&str; 3] = ["video", "audio", "image"];

/// Validation schema document
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Schema {
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,
    #[serde(default)]
    pub required: Vec<String>,
}

/// One schema property
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Property {
    #[serde(rename = "type", default)]
    pub value_type: Option<String>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(rename = "enum", default)]
    pub allowed: Option<Vec<Value>>,
    /// Inner properties for the nested groups
    #[serde(default)]
    pub properties: Option<BTreeMap<String, Property>>,
}

impl Schema {
    /// Column names derived from the schema, in sorted property order.
    pub fn columns(&self) -> Vec<String> {
        self.column_specs().into_iter().map(|(name, _)| name).collect()
    }

    /// Column names paired with the property that governs each.
    fn column_specs(&self) -> Vec<(String, &Property)> {
        let mut specs = Vec::new();
        for (name, property) in &self.properties {
            match (&property.properties, NESTED_GROUPS.contains(&name.as_str())) {
                (Some(inner), true) => {
                    for (field, inner_property) in inner {
                        specs.push((format!("{}/{}", name, field), inner_property));
                    }
                }
                _ => specs.push((name.clone(), property)),
            }
        }
        specs
    }

    /// Validate one stat document for an item of the given prompt type.
    ///
    /// Returns one reason per violated check, in column order. Columns that
    /// do not apply to the prompt type are skipped entirely.
    pub fn validate(&self, stat: &Value, prompt_type: &str) -> Vec<String> {
        let mut reasons = Vec::new();

        for (column, property) in self.column_specs() {
            if !column_applies(&column, prompt_type) {
                continue;
            }

            let Some(value) = extract_value(stat, &column, prompt_type) else {
                if self.required.iter().any(|r| r == &column) {
                    reasons.push(format!("{} is missing", column));
                }
                continue;
            };

            // The processing pipeline writes non-finite floats as string
            // sentinels; they carry no checkable value.
            if matches!(value, Value::String(s) if s == "NaN" || s == "Infinity") {
                continue;
            }

            if let Some(kind) = &property.value_type {
                if !type_matches(value, kind) {
                    reasons.push(format!("{} = {} is not {}", column, value, kind));
                    continue;
                }
            }

            if let Some(number) = value.as_f64() {
                if let Some(minimum) = property.minimum {
                    if number < minimum {
                        reasons.push(format!("{} = {} below minimum {}", column, value, minimum));
                    }
                }
                if let Some(maximum) = property.maximum {
                    if number > maximum {
                        reasons.push(format!("{} = {} above maximum {}", column, value, maximum));
                    }
                }
            }

            if let Some(allowed) = &property.allowed {
                if !allowed.contains(value) {
                    reasons.push(format!("{} = {} is not an allowed value", column, value));
                }
            }
        }

        reasons
    }
}

/// Whether a schema column applies to items of the given prompt type.
pub fn column_applies(column: &str, prompt_type: &str) -> bool {
    match column.split_once('/') {
        Some((group, _)) => group == prompt_type || (group == "audio" && prompt_type == "video"),
        None => prompt_type == "recording",
    }
}

/// Extract a column's value from a stat document, with prompt-type
/// awareness. Returns None for inapplicable columns and null values.
pub fn extract_value<'a>(stat: &'a Value, column: &str, prompt_type: &str) -> Option<&'a Value> {
    if !column_applies(column, prompt_type) {
        return None;
    }

    let value = match column.split_once('/') {
        Some((group, field)) => stat.get(group)?.get(field)?,
        None => stat.get(column)?,
    };

    if value.is_null() {
        None
    } else {
        Some(value)
    }
}

fn type_matches(value: &Value, kind: &str) -> bool {
    match kind {
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        // Unknown kinds are not enforced
        _ => true,
    }
}
