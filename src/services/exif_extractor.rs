//! Photo metadata extraction
//!
//! Reads each photo item once and produces everything the report needs from
//! it: the configured EXIF tags as a JSON object, a SHA-256 checksum of the
//! file bytes used as the photo's stable reference token, and decimal GPS
//! coordinates when the photo carries them.
//!
//! Photos are evidence, so a photo that cannot be read or decoded is an
//! error, not a blank cell.

use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExifError {
    #[error("Failed to read photo: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode EXIF data: {0}")]
    Decode(String),

    #[error("Unknown EXIF tag name: {0}")]
    UnknownTag(String),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Everything extracted from one photo file.
#[derive(Debug, Clone)]
pub struct PhotoMeta {
    /// Configured EXIF tags present in the photo, keyed by tag name.
    pub exif: serde_json::Value,
    /// Hex SHA-256 of the file bytes.
    pub checksum: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Tag names extracted when the configuration does not override them.
pub const DEFAULT_TAG_NAMES: &[&str] = &[
    "Make",
    "Model",
    "Orientation",
    "Software",
    "DateTime",
    "YCbCrPositioning",
    "Compression",
    "XResolution",
    "YResolution",
    "ResolutionUnit",
    "ExposureTime",
    "FNumber",
    "ExposureProgram",
    "ExifVersion",
    "DateTimeOriginal",
    "DateTimeDigitized",
    "ComponentsConfiguration",
    "CompressedBitsPerPixel",
    "ExposureBiasValue",
    "MaxApertureValue",
    "MeteringMode",
    "Flash",
    "FocalLength",
    "FlashpixVersion",
    "ColorSpace",
    "PixelXDimension",
    "PixelYDimension",
    "FileSource",
    "InteroperabilityIndex",
    "InteroperabilityVersion",
    "GPSLatitude",
    "GPSLongitude",
];

#[derive(Debug, Clone)]
pub struct ExifExtractor {
    tags: Vec<(String, Tag)>,
}

impl ExifExtractor {
    /// Build an extractor for the given tag names. A name that does not
    /// resolve to a known tag is a configuration error.
    pub fn new(tag_names: &[String]) -> Result<Self, ExifError> {
        let mut tags = Vec::with_capacity(tag_names.len());
        for name in tag_names {
            let tag =
                tag_by_name(name).ok_or_else(|| ExifError::UnknownTag(name.to_string()))?;
            tags.push((name.clone(), tag));
        }
        Ok(Self { tags })
    }

    /// Read one photo file and extract metadata, checksum and coordinates.
    ///
    /// File IO and EXIF decoding run on a blocking task.
    pub async fn read_photo(&self, path: &Path) -> Result<PhotoMeta, ExifError> {
        let tags = self.tags.clone();
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || extract(&tags, &path))
            .await
            .map_err(|e| ExifError::Task(e.to_string()))?
    }
}

fn extract(tags: &[(String, Tag)], path: &Path) -> Result<PhotoMeta, ExifError> {
    let bytes = std::fs::read(path)?;
    let checksum = format!("{:x}", Sha256::digest(&bytes));

    let exif = decode(&bytes)?;

    // Every configured tag gets a key; absent tags are null so the JSON
    // shape is the same for every photo.
    let mut fields = serde_json::Map::new();
    let mut latitude = None;
    let mut longitude = None;
    for (name, tag) in tags {
        let Some(field) = exif.get_field(*tag, In::PRIMARY) else {
            fields.insert(name.clone(), serde_json::Value::Null);
            continue;
        };
        if *tag == Tag::GPSLatitude {
            latitude = rationals_to_decimal(&field.value);
        } else if *tag == Tag::GPSLongitude {
            longitude = rationals_to_decimal(&field.value);
        }
        fields.insert(name.clone(), field_to_json(field));
    }

    Ok(PhotoMeta {
        exif: serde_json::Value::Object(fields),
        checksum,
        latitude,
        longitude,
    })
}

/// Decode EXIF from the photo bytes.
///
/// Tries the container formats the reader knows (JPEG, TIFF, PNG, ...) and
/// falls back to scanning for a bare `Exif\0\0` block, which some upload
/// paths produce.
fn decode(bytes: &[u8]) -> Result<exif::Exif, ExifError> {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => Ok(exif),
        Err(container_err) => {
            if let Some(pos) = find_marker(bytes, b"Exif\x00\x00") {
                let raw = bytes[pos + 6..].to_vec();
                return Reader::new()
                    .read_raw(raw)
                    .map_err(|e| ExifError::Decode(e.to_string()));
            }
            Err(ExifError::Decode(container_err.to_string()))
        }
    }
}

fn find_marker(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn field_to_json(field: &exif::Field) -> serde_json::Value {
    // Timestamps become epoch microseconds so the report sorts and diffs
    // them as numbers.
    if matches!(
        field.tag,
        Tag::DateTime | Tag::DateTimeOriginal | Tag::DateTimeDigitized
    ) {
        if let Value::Ascii(parts) = &field.value {
            if let Some(raw) = parts.first() {
                let text = String::from_utf8_lossy(raw);
                let text = text.trim_end_matches('\0');
                if let Ok(stamp) = NaiveDateTime::parse_from_str(text, "%Y:%m:%d %H:%M:%S") {
                    return json!(stamp.and_utc().timestamp_micros());
                }
                return json!(text);
            }
        }
    }

    match &field.value {
        Value::Ascii(parts) => {
            let mut strings: Vec<String> = parts
                .iter()
                .map(|raw| {
                    String::from_utf8_lossy(raw)
                        .trim_end_matches('\0')
                        .to_string()
                })
                .collect();
            if strings.len() == 1 {
                json!(strings.remove(0))
            } else {
                json!(strings)
            }
        }
        Value::Short(values) => single_or_list(values.iter().map(|v| json!(v))),
        Value::Long(values) => single_or_list(values.iter().map(|v| json!(v))),
        Value::SShort(values) => single_or_list(values.iter().map(|v| json!(v))),
        Value::SLong(values) => single_or_list(values.iter().map(|v| json!(v))),
        Value::Rational(values) => {
            single_or_list(values.iter().map(|r| json!([r.num, r.denom])))
        }
        Value::SRational(values) => {
            single_or_list(values.iter().map(|r| json!([r.num, r.denom])))
        }
        Value::Float(values) => single_or_list(values.iter().map(|v| json!(v))),
        Value::Double(values) => single_or_list(values.iter().map(|v| json!(v))),
        Value::Undefined(bytes, _) => {
            // Version-style tags carry printable ASCII behind the Undefined
            // type, e.g. ExifVersion "0220".
            if !bytes.is_empty() && bytes.iter().all(|b| (0x20..=0x7E).contains(b)) {
                json!(String::from_utf8_lossy(bytes))
            } else {
                json!(field.display_value().to_string())
            }
        }
        _ => json!(field.display_value().to_string()),
    }
}

fn single_or_list(values: impl Iterator<Item = serde_json::Value>) -> serde_json::Value {
    let mut collected: Vec<serde_json::Value> = values.collect();
    if collected.len() == 1 {
        collected.remove(0)
    } else {
        serde_json::Value::Array(collected)
    }
}

/// Convert a degrees/minutes/seconds rational triple to decimal degrees.
fn rationals_to_decimal(value: &Value) -> Option<f64> {
    let Value::Rational(parts) = value else {
        return None;
    };
    if parts.len() != 3 {
        return None;
    }
    let decimal = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;
    decimal.is_finite().then_some(decimal)
}

fn tag_by_name(name: &str) -> Option<Tag> {
    let tag = match name {
        "Make" => Tag::Make,
        "Model" => Tag::Model,
        "Orientation" => Tag::Orientation,
        "Software" => Tag::Software,
        "DateTime" => Tag::DateTime,
        "YCbCrPositioning" => Tag::YCbCrPositioning,
        "Compression" => Tag::Compression,
        "XResolution" => Tag::XResolution,
        "YResolution" => Tag::YResolution,
        "ResolutionUnit" => Tag::ResolutionUnit,
        "ExposureTime" => Tag::ExposureTime,
        "FNumber" => Tag::FNumber,
        "ExposureProgram" => Tag::ExposureProgram,
        "ExifVersion" => Tag::ExifVersion,
        "DateTimeOriginal" => Tag::DateTimeOriginal,
        "DateTimeDigitized" => Tag::DateTimeDigitized,
        "ComponentsConfiguration" => Tag::ComponentsConfiguration,
        "CompressedBitsPerPixel" => Tag::CompressedBitsPerPixel,
        "ExposureBiasValue" => Tag::ExposureBiasValue,
        "MaxApertureValue" => Tag::MaxApertureValue,
        "MeteringMode" => Tag::MeteringMode,
        "Flash" => Tag::Flash,
        "FocalLength" => Tag::FocalLength,
        "FlashpixVersion" => Tag::FlashpixVersion,
        "ColorSpace" => Tag::ColorSpace,
        "PixelXDimension" => Tag::PixelXDimension,
        "PixelYDimension" => Tag::PixelYDimension,
        "FileSource" => Tag::FileSource,
        "InteroperabilityIndex" => Tag::InteroperabilityIndex,
        "InteroperabilityVersion" => Tag::InteroperabilityVersion,
        "GPSLatitude" => Tag::GPSLatitude,
        "GPSLongitude" => Tag::GPSLongitude,
        _ => return None,
    };
    Some(tag)
}
