//! Version codec
//!
//! Model versions are written as `{base_model}_{sequence}` (e.g. `YOLOv8_3`),
//! where `base_model` names one of eight known network architectures. The
//! codec also derives a synthetic training completion time from the sequence
//! number and produces the candidate list shown in the version picker.
//!
//! A second, legacy grammar (`v2024.01.15.1430`) is produced by
//! [`timestamp_version`] and checked by the form validator. The two grammars
//! are independent and are not reconciled.

use super::registry::{Model, ModelType};
use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z0-9]+)_([0-9]+)$").expect("valid version pattern"));

/// 2024-01-01T00:00:00Z
const COMPLETION_BASE_SECS: i64 = 1_704_067_200;

/// Minutes added to the completion base per sequence step
const MINUTES_PER_SEQUENCE: i64 = 60;

/// Number of candidates produced by [`generate_version_options`]
const VERSION_OPTION_COUNT: u64 = 8;

/// Candidates that keep the model's own base model
const OWN_BASE_OPTIONS: u64 = 4;

/// Underlying network architecture encoded in a version string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseModel {
    #[serde(rename = "bisegnet")]
    Bisegnet,
    #[serde(rename = "sam")]
    Sam,
    #[serde(rename = "YOLOv8")]
    YoloV8,
    #[serde(rename = "YOLOv11")]
    YoloV11,
    #[serde(rename = "unet")]
    Unet,
    #[serde(rename = "deeplab")]
    Deeplab,
    #[serde(rename = "maskrcnn")]
    MaskRcnn,
    #[serde(rename = "fasterrcnn")]
    FasterRcnn,
}

impl BaseModel {
    /// All identifiers in their fixed order
    pub const ALL: [BaseModel; 8] = [
        Self::Bisegnet,
        Self::Sam,
        Self::YoloV8,
        Self::YoloV11,
        Self::Unet,
        Self::Deeplab,
        Self::MaskRcnn,
        Self::FasterRcnn,
    ];

    const SEGMENTATION: [BaseModel; 5] = [
        Self::Bisegnet,
        Self::Sam,
        Self::Unet,
        Self::Deeplab,
        Self::MaskRcnn,
    ];

    const DETECTION: [BaseModel; 3] = [Self::YoloV8, Self::YoloV11, Self::FasterRcnn];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bisegnet => "bisegnet",
            Self::Sam => "sam",
            Self::YoloV8 => "YOLOv8",
            Self::YoloV11 => "YOLOv11",
            Self::Unet => "unet",
            Self::Deeplab => "deeplab",
            Self::MaskRcnn => "maskrcnn",
            Self::FasterRcnn => "fasterrcnn",
        }
    }

    /// Base models conventionally used for a model type
    ///
    /// Advisory only: nothing checks a model's declared type against the
    /// base model in its version.
    pub fn recommended_for(model_type: ModelType) -> &'static [BaseModel] {
        match model_type {
            ModelType::Segmentation => &Self::SEGMENTATION,
            ModelType::Detection => &Self::DETECTION,
        }
    }
}

impl fmt::Display for BaseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown base model '{0}'")]
pub struct UnknownBaseModel(pub String);

impl FromStr for BaseModel {
    type Err = UnknownBaseModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|base| base.as_str() == s)
            .ok_or_else(|| UnknownBaseModel(s.to_string()))
    }
}

/// Decoded `{base_model}_{sequence}` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedVersion {
    pub base_model: BaseModel,
    pub sequence_number: u64,
}

/// Entry of the version picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionOption {
    pub value: String,
    pub label: String,
}

impl VersionOption {
    fn new(value: String) -> Self {
        Self {
            label: value.clone(),
            value,
        }
    }
}

pub fn encode(base_model: BaseModel, sequence_number: u64) -> String {
    format!("{}_{}", base_model, sequence_number)
}

/// Decode a version string
///
/// Returns `None` when the string does not match `^[a-zA-Z0-9]+_[0-9]+$`, when
/// the prefix is not a known base model, or when the sequence overflows `u64`.
pub fn decode(version: &str) -> Option<ParsedVersion> {
    let captures = VERSION_PATTERN.captures(version)?;
    let base_model = captures[1].parse().ok()?;
    let sequence_number = captures[2].parse().ok()?;

    Some(ParsedVersion {
        base_model,
        sequence_number,
    })
}

pub fn is_valid_version(version: &str) -> bool {
    decode(version).is_some()
}

/// Normalized display form, or the raw string when it does not decode
pub fn format_version_display(version: &str) -> String {
    match decode(version) {
        Some(parsed) => encode(parsed.base_model, parsed.sequence_number),
        None => version.to_string(),
    }
}

/// Next free version for `base_model` given the versions already in use
///
/// Versions that fail to decode or belong to another base model are ignored.
pub fn next_version<I, S>(base_model: BaseModel, existing_versions: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max_sequence = existing_versions
        .into_iter()
        .filter_map(|v| decode(v.as_ref()))
        .filter(|parsed| parsed.base_model == base_model)
        .map(|parsed| parsed.sequence_number)
        .max()
        .unwrap_or(0);

    encode(base_model, max_sequence.saturating_add(1))
}

fn completion_base() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::seconds(COMPLETION_BASE_SECS)
}

/// Synthetic "training completed" instant for display
///
/// This is not a measurement: it is 2024-01-01T00:00:00Z plus one hour per
/// sequence step. Undecodable versions (and sequences too large to represent)
/// map to the base instant.
pub fn derived_completion_time(version: &str) -> DateTime<Utc> {
    let base = completion_base();

    decode(version)
        .and_then(|parsed| i64::try_from(parsed.sequence_number).ok())
        .and_then(|seq| seq.checked_mul(MINUTES_PER_SEQUENCE))
        .and_then(TimeDelta::try_minutes)
        .and_then(|offset| base.checked_add_signed(offset))
        .unwrap_or(base)
}

/// Candidate versions for the version picker of `model`
///
/// Sequences 1-4 keep the model's own base model; sequences 5-8 walk the fixed
/// base model list from its start. A version that does not decode yields a
/// single option holding the raw string.
pub fn generate_version_options(model: &Model) -> Vec<VersionOption> {
    let Some(parsed) = decode(&model.version) else {
        return vec![VersionOption::new(model.version.clone())];
    };

    (1..=VERSION_OPTION_COUNT)
        .map(|sequence| {
            let base_model = if sequence <= OWN_BASE_OPTIONS {
                parsed.base_model
            } else {
                let index = (sequence - OWN_BASE_OPTIONS - 1) as usize % BaseModel::ALL.len();
                BaseModel::ALL[index]
            };
            VersionOption::new(encode(base_model, sequence))
        })
        .collect()
}

/// Legacy timestamp version, e.g. `v2024.01.15.1430`
pub fn timestamp_version(at: DateTime<Utc>) -> String {
    at.format("v%Y.%m.%d.%H%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metadata::ModelMetadata;
    use crate::models::registry::ModelStatus;
    use chrono::TimeZone;

    fn model_with_version(version: &str) -> Model {
        Model {
            id: "model-1".to_string(),
            name: "Screen Front".to_string(),
            model_type: ModelType::Segmentation,
            version: version.to_string(),
            timestamp: Utc::now(),
            tags: vec![],
            status: ModelStatus::Active,
            metadata: ModelMetadata::default(),
        }
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(BaseModel::YoloV8, 3), "YOLOv8_3");
        assert_eq!(encode(BaseModel::Bisegnet, 0), "bisegnet_0");
    }

    #[test]
    fn test_decode_valid() {
        assert_eq!(
            decode("YOLOv11_12"),
            Some(ParsedVersion {
                base_model: BaseModel::YoloV11,
                sequence_number: 12
            })
        );
        assert_eq!(decode("sam_007").map(|p| p.sequence_number), Some(7));
    }

    #[test]
    fn test_decode_rejects_unknown_base_model() {
        assert_eq!(decode("unknownmodel_3"), None);
        // Case matters
        assert_eq!(decode("yolov8_3"), None);
    }

    #[test]
    fn test_decode_rejects_bad_shape() {
        assert_eq!(decode("bisegnet_abc"), None);
        assert_eq!(decode("bisegnet_"), None);
        assert_eq!(decode("_3"), None);
        assert_eq!(decode("bisegnet_1_2"), None);
        assert_eq!(decode("v2024.01.15.1430"), None);
        assert_eq!(decode(""), None);
    }

    #[test]
    fn test_decode_rejects_overflowing_sequence() {
        assert_eq!(decode("sam_99999999999999999999999"), None);
    }

    #[test]
    fn test_base_model_from_str() {
        assert_eq!("fasterrcnn".parse::<BaseModel>(), Ok(BaseModel::FasterRcnn));
        assert_eq!(
            "resnet".parse::<BaseModel>(),
            Err(UnknownBaseModel("resnet".to_string()))
        );
    }

    #[test]
    fn test_recommended_base_models_partition_all() {
        let seg = BaseModel::recommended_for(ModelType::Segmentation);
        let det = BaseModel::recommended_for(ModelType::Detection);
        assert_eq!(seg.len() + det.len(), BaseModel::ALL.len());
        assert!(seg.contains(&BaseModel::Sam));
        assert!(det.contains(&BaseModel::YoloV8));
        assert!(seg.iter().all(|b| !det.contains(b)));
    }

    #[test]
    fn test_next_version() {
        assert_eq!(
            next_version(BaseModel::YoloV8, ["YOLOv8_1", "YOLOv8_3", "sam_9"]),
            "YOLOv8_4"
        );
    }

    #[test]
    fn test_next_version_without_matches() {
        assert_eq!(next_version(BaseModel::Unet, Vec::<String>::new()), "unet_1");
        assert_eq!(
            next_version(BaseModel::Unet, ["garbage", "sam_4", "v1.0.0"]),
            "unet_1"
        );
    }

    #[test]
    fn test_derived_completion_time_is_synthetic_offset() {
        // Display-only derivation: base instant plus one hour per sequence step
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            derived_completion_time("bisegnet_1"),
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap()
        );
        assert_eq!(
            derived_completion_time("sam_25"),
            Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap()
        );
        assert_eq!(derived_completion_time("bisegnet_0"), base);
    }

    #[test]
    fn test_derived_completion_time_falls_back_to_base() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(derived_completion_time("not-a-version"), base);
        assert_eq!(derived_completion_time("sam_18446744073709551615"), base);
    }

    #[test]
    fn test_generate_version_options() {
        let options = generate_version_options(&model_with_version("bisegnet_1"));
        let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();

        assert_eq!(
            values,
            vec![
                "bisegnet_1",
                "bisegnet_2",
                "bisegnet_3",
                "bisegnet_4",
                "bisegnet_5",
                "sam_6",
                "YOLOv8_7",
                "YOLOv11_8",
            ]
        );
        assert!(options.iter().all(|o| o.label == o.value));
    }

    #[test]
    fn test_generate_version_options_undecodable() {
        let options = generate_version_options(&model_with_version("v2024.01.15.1430"));
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, "v2024.01.15.1430");
    }

    #[test]
    fn test_format_version_display() {
        assert_eq!(format_version_display("deeplab_010"), "deeplab_10");
        assert_eq!(format_version_display("custom"), "custom");
    }

    #[test]
    fn test_timestamp_version() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();
        assert_eq!(timestamp_version(at), "v2024.01.15.1430");
    }

    #[test]
    fn test_base_model_serde_uses_identifier() {
        let json = serde_json::to_string(&BaseModel::YoloV11).unwrap();
        assert_eq!(json, "\"YOLOv11\"");
        let parsed: BaseModel = serde_json::from_str("\"maskrcnn\"").unwrap();
        assert_eq!(parsed, BaseModel::MaskRcnn);
    }
}
