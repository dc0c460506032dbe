//! Table query engine
//!
//! Derives the filtered and sorted view of the registry shown in the model
//! table. Everything here is pure: the input list is never modified and the
//! same inputs always give the same output.

use super::registry::{Model, ModelStatus, ModelType};
use crate::schemes::Association;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Conjunctive row filter; unset criteria match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ModelStatus>,
    /// A model passes when it carries at least one of these tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort request; `field` is resolved to a [`SortField`] at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Sortable columns, top-level and metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Type,
    Version,
    Timestamp,
    Tags,
    Status,
    Size,
    Accuracy,
    Framework,
    Description,
    Author,
    License,
    TrainingDataset,
    InputShape,
    OutputShape,
    Parameters,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "id" => Self::Id,
            "name" => Self::Name,
            "type" | "model_type" => Self::Type,
            "version" => Self::Version,
            "timestamp" => Self::Timestamp,
            "tags" => Self::Tags,
            "status" => Self::Status,
            "size" => Self::Size,
            "accuracy" => Self::Accuracy,
            "framework" => Self::Framework,
            "description" => Self::Description,
            "author" => Self::Author,
            "license" => Self::License,
            "training_dataset" | "trainingDataset" => Self::TrainingDataset,
            "input_shape" | "inputShape" => Self::InputShape,
            "output_shape" | "outputShape" => Self::OutputShape,
            "parameters" => Self::Parameters,
            other => return Err(format!("unknown sort field '{}'", other)),
        };
        Ok(field)
    }
}

/// Runtime category of a sort value
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey<'a> {
    /// Absent optional value; orders before everything else
    Missing,
    Instant(DateTime<Utc>),
    Text(Cow<'a, str>),
    Number(f64),
}

impl fmt::Display for SortKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Instant(at) => write!(f, "{}", at.to_rfc3339()),
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

fn join<T: ToString>(values: &[T]) -> Cow<'static, str> {
    Cow::Owned(
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

fn optional_text(value: &Option<String>) -> SortKey<'_> {
    value
        .as_deref()
        .map_or(SortKey::Missing, |s| SortKey::Text(Cow::Borrowed(s)))
}

impl SortField {
    /// Extract the sort value of this field from a model
    pub fn key<'a>(self, model: &'a Model) -> SortKey<'a> {
        let meta = &model.metadata;
        match self {
            Self::Id => SortKey::Text(Cow::Borrowed(model.id.as_str())),
            Self::Name => SortKey::Text(Cow::Borrowed(model.name.as_str())),
            Self::Type => SortKey::Text(Cow::Owned(model.model_type.to_string())),
            Self::Version => SortKey::Text(Cow::Borrowed(model.version.as_str())),
            Self::Timestamp => SortKey::Instant(model.timestamp),
            Self::Tags => SortKey::Text(join(&model.tags)),
            Self::Status => SortKey::Text(Cow::Owned(model.status.to_string())),
            Self::Size => SortKey::Number(meta.size as f64),
            Self::Accuracy => SortKey::Number(meta.accuracy),
            Self::Framework => SortKey::Text(Cow::Borrowed(meta.framework.as_str())),
            Self::Description => optional_text(&meta.description),
            Self::Author => optional_text(&meta.author),
            Self::License => optional_text(&meta.license),
            Self::TrainingDataset => optional_text(&meta.training_dataset),
            Self::InputShape => meta
                .input_shape
                .as_deref()
                .map_or(SortKey::Missing, |s| SortKey::Text(join(s))),
            Self::OutputShape => meta
                .output_shape
                .as_deref()
                .map_or(SortKey::Missing, |s| SortKey::Text(join(s))),
            Self::Parameters => meta
                .parameters
                .map_or(SortKey::Missing, |p| SortKey::Number(p as f64)),
        }
    }
}

/// Case-insensitive text ordering with a byte-order tie break
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Compare two sort values by their runtime category
pub fn compare_keys(a: &SortKey<'_>, b: &SortKey<'_>) -> Ordering {
    match (a, b) {
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (SortKey::Missing, _) => Ordering::Less,
        (_, SortKey::Missing) => Ordering::Greater,
        (SortKey::Instant(x), SortKey::Instant(y)) => x.cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => locale_compare(x, y),
        (SortKey::Number(x), SortKey::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (x, y) => locale_compare(&x.to_string(), &y.to_string()),
    }
}

fn matches_filter(model: &Model, filter: &FilterSpec) -> bool {
    if let Some(model_type) = filter.model_type
        && model.model_type != model_type
    {
        return false;
    }
    if let Some(status) = filter.status
        && model.status != status
    {
        return false;
    }
    filter.tags.is_empty() || filter.tags.iter().any(|t| model.tags.contains(t))
}

/// Case-insensitive substring search over name, description, framework and tags
///
/// `term` must already be lowercase.
fn matches_search(model: &Model, term: &str) -> bool {
    let contains = |s: &str| s.to_lowercase().contains(term);

    contains(model.name.as_str())
        || model.metadata.description.as_deref().is_some_and(contains)
        || contains(model.metadata.framework.as_str())
        || model.tags.iter().any(|t| contains(t.as_str()))
}

/// Sort `models` in place; unknown fields leave the order untouched
pub fn sort_models(models: &mut [Model], sort: &SortSpec) {
    let Ok(field) = sort.field.parse::<SortField>() else {
        tracing::debug!(field = %sort.field, "Ignoring unknown sort field");
        return;
    };

    models.sort_by(|a, b| {
        let ordering = compare_keys(&field.key(a), &field.key(b));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Filter, search and sort a model list
///
/// Filtering is conjunctive across type, status, tag intersection and the
/// free-text search. Sorting is stable and applied to the filtered copy; with
/// no sort the registry order is kept.
pub fn query(
    models: &[Model],
    filter: &FilterSpec,
    sort: Option<&SortSpec>,
    search_term: &str,
) -> Vec<Model> {
    let term = search_term.to_lowercase();

    let mut result: Vec<Model> = models
        .iter()
        .filter(|m| term.is_empty() || matches_search(m, &term))
        .filter(|m| matches_filter(m, filter))
        .cloned()
        .collect();

    if let Some(sort) = sort {
        sort_models(&mut result, sort);
    }

    result
}

/// Move models with an enabled association to the front
///
/// Associated rows are ordered by descending priority; the relative order of
/// everything else (and of equal priorities) is preserved.
pub fn pin_associated(mut models: Vec<Model>, associations: &[Association]) -> Vec<Model> {
    let priorities: HashMap<&str, u8> = associations
        .iter()
        .filter(|a| a.is_enabled)
        .map(|a| (a.model_id.as_str(), a.priority))
        .collect();

    models.sort_by(|a, b| {
        match (
            priorities.get(a.id.as_str()),
            priorities.get(b.id.as_str()),
        ) {
            (Some(x), Some(y)) => y.cmp(x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });

    models
}

/// Counts shown in the statistics panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub total: usize,
    pub filtered: usize,
    pub active: usize,
    pub archived: usize,
    pub deprecated: usize,
    pub segmentation: usize,
    pub detection: usize,
}

impl ModelStats {
    /// Tally `models`; `filtered` is the size of the current view
    pub fn collect(models: &[Model], filtered: usize) -> Self {
        let mut stats = Self {
            total: models.len(),
            filtered,
            ..Default::default()
        };

        for model in models {
            match model.status {
                ModelStatus::Active => stats.active += 1,
                ModelStatus::Archived => stats.archived += 1,
                ModelStatus::Deprecated => stats.deprecated += 1,
            }
            match model.model_type {
                ModelType::Segmentation => stats.segmentation += 1,
                ModelType::Detection => stats.detection += 1,
            }
        }

        stats
    }
}
