//! Model form validation
//!
//! Each field validator checks its rules in order and stops at the first
//! failure. [`validate_model_form`] runs the relevant validators and collects
//! one message per failing field. Validation never mutates anything; callers
//! abort the write when the result is invalid.

use super::registry::{Model, ModelFormData};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use thiserror::Error;

/// Legacy dotted version grammar (`1.0.0`, `v1.2.3`, `v2024.01.15.1430`)
static LEGACY_VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?[0-9]+\.[0-9]+\.[0-9]+(\.[0-9]+)?$").expect("valid legacy version pattern")
});

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const MAX_TAGS: usize = 10;
pub const TAG_MAX_CHARS: usize = 20;

/// 10 GiB
pub const MAX_MODEL_SIZE_BYTES: f64 = 10.0 * 1024.0 * 1024.0 * 1024.0;

const NAME_FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const TAG_FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', ','];

/// Form fields that can carry an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Version,
    Tags,
    Accuracy,
    Size,
}

/// A single failed rule; `Display` is the user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Model name is required")]
    NameRequired,
    #[error("Model name must be at least 2 characters")]
    NameTooShort,
    #[error("Model name must not exceed 100 characters")]
    NameTooLong,
    #[error("Model name contains invalid characters")]
    NameInvalidCharacters,

    #[error("Version is required")]
    VersionRequired,
    #[error("Invalid version format, use v1.0.0 or 1.0.0")]
    VersionBadFormat,

    #[error("Accuracy must be a number")]
    AccuracyNotNumber,
    #[error("Accuracy must be between 0 and 1")]
    AccuracyOutOfRange,

    #[error("File size must be a non-negative number")]
    SizeNegative,
    #[error("File size must not exceed 10GB")]
    SizeTooLarge,

    #[error("No more than 10 tags are allowed")]
    TooManyTags,
    #[error("Tags must not be empty")]
    EmptyTag,
    #[error("A tag must not exceed 20 characters")]
    TagTooLong,
    #[error("Tag contains invalid characters")]
    TagInvalidCharacters,
    #[error("Tags must be unique")]
    DuplicateTags,
}

pub type FieldResult = Result<(), FieldError>;

/// Aggregated result of [`validate_model_form`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValidation {
    pub is_valid: bool,
    pub errors: BTreeMap<FormField, String>,
}

impl FormValidation {
    fn from_errors(errors: BTreeMap<FormField, String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

pub fn validate_model_name(name: &str) -> FieldResult {
    if name.trim().is_empty() {
        return Err(FieldError::NameRequired);
    }

    let chars = name.chars().count();
    if chars < NAME_MIN_CHARS {
        return Err(FieldError::NameTooShort);
    }
    if chars > NAME_MAX_CHARS {
        return Err(FieldError::NameTooLong);
    }

    if name.contains(NAME_FORBIDDEN) {
        return Err(FieldError::NameInvalidCharacters);
    }

    Ok(())
}

/// Validate a legacy dotted version (not the `{base}_{seq}` codec grammar)
pub fn validate_version(version: &str) -> FieldResult {
    if version.trim().is_empty() {
        return Err(FieldError::VersionRequired);
    }

    if !LEGACY_VERSION_PATTERN.is_match(version) {
        return Err(FieldError::VersionBadFormat);
    }

    Ok(())
}

pub fn validate_accuracy(accuracy: f64) -> FieldResult {
    if accuracy.is_nan() {
        return Err(FieldError::AccuracyNotNumber);
    }

    if !(0.0..=1.0).contains(&accuracy) {
        return Err(FieldError::AccuracyOutOfRange);
    }

    Ok(())
}

/// Validate an artifact size in bytes
pub fn validate_file_size(size: f64) -> FieldResult {
    if size.is_nan() || size < 0.0 {
        return Err(FieldError::SizeNegative);
    }

    if size > MAX_MODEL_SIZE_BYTES {
        return Err(FieldError::SizeTooLarge);
    }

    Ok(())
}

pub fn validate_tags<S: AsRef<str>>(tags: &[S]) -> FieldResult {
    if tags.len() > MAX_TAGS {
        return Err(FieldError::TooManyTags);
    }

    for tag in tags {
        let tag = tag.as_ref();
        if tag.trim().is_empty() {
            return Err(FieldError::EmptyTag);
        }
        if tag.chars().count() > TAG_MAX_CHARS {
            return Err(FieldError::TagTooLong);
        }
        if tag.contains(TAG_FORBIDDEN) {
            return Err(FieldError::TagInvalidCharacters);
        }
    }

    let unique: HashSet<&str> = tags.iter().map(AsRef::as_ref).collect();
    if unique.len() != tags.len() {
        return Err(FieldError::DuplicateTags);
    }

    Ok(())
}

/// Run every relevant validator over a form submission
///
/// Accuracy and size are only checked when the form provides them. The
/// version is only checked when the form carries an explicit legacy version.
pub fn validate_model_form(form: &ModelFormData) -> FormValidation {
    let mut errors = BTreeMap::new();
    let mut record = |field: FormField, result: FieldResult| {
        if let Err(e) = result {
            errors.insert(field, e.to_string());
        }
    };

    record(FormField::Name, validate_model_name(&form.name));
    record(FormField::Tags, validate_tags(&form.tags));

    if let Some(ref version) = form.version {
        record(FormField::Version, validate_version(version));
    }
    if let Some(accuracy) = form.metadata.accuracy {
        record(FormField::Accuracy, validate_accuracy(accuracy));
    }
    if let Some(size) = form.metadata.size {
        record(FormField::Size, validate_file_size(size));
    }

    FormValidation::from_errors(errors)
}

/// Advisory check for a case-insensitive name clash
///
/// `exclude_id` skips the record being edited so it is not flagged against itself.
pub fn is_model_name_duplicate(name: &str, models: &[Model], exclude_id: Option<&str>) -> bool {
    let needle = name.to_lowercase();
    models
        .iter()
        .any(|m| m.name.to_lowercase() == needle && Some(m.id.as_str()) != exclude_id)
}
