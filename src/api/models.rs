//! API request and response models

use crate::models::version::{derived_completion_time, format_version_display};
use crate::models::{
    BaseModel, FilterSpec, FormValidation, Model, ModelStats, ModelStatus, ModelType,
    SortDirection, SortSpec,
};
use crate::schemes::{Association, AssociationConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Query parameters of `GET /models`
#[derive(Debug, Default, Deserialize)]
pub struct ListModelsQuery {
    #[serde(default, rename = "type")]
    pub model_type: Option<ModelType>,
    #[serde(default)]
    pub status: Option<ModelStatus>,
    /// Comma separated tag list
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub direction: Option<SortDirection>,
    /// Pin models associated with this scheme
    #[serde(default)]
    pub scheme: Option<String>,
}

impl ListModelsQuery {
    pub fn filter(&self) -> FilterSpec {
        let tags = self
            .tags
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        FilterSpec {
            model_type: self.model_type,
            status: self.status,
            tags,
        }
    }

    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort
            .as_ref()
            .map(|field| SortSpec::new(field.clone(), self.direction.unwrap_or_default()))
    }

    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }
}

/// One row of the model table
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelRow {
    #[serde(flatten)]
    pub model: Model,
    pub version_display: String,
    /// Display-only instant derived from the version sequence
    pub training_completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<Association>,
}

impl ModelRow {
    pub fn new(model: Model, associations: &[Association]) -> Self {
        let association = associations
            .iter()
            .find(|a| a.model_id == model.id)
            .cloned();

        Self {
            version_display: format_version_display(&model.version),
            training_completed_at: derived_completion_time(&model.version),
            association,
            model,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListModelsResponse {
    pub models: Vec<ModelRow>,
    pub stats: ModelStats,
}

/// Query parameters of `POST /models/validate`
#[derive(Debug, Default, Deserialize)]
pub struct ValidateQuery {
    /// Model being edited; excluded from the duplicate-name check
    #[serde(default)]
    pub exclude_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    #[serde(flatten)]
    pub validation: FormValidation,
    /// Advisory only, never blocks a save
    pub name_duplicate: bool,
}

#[derive(Debug, Deserialize)]
pub struct NextVersionQuery {
    pub base_model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextVersionResponse {
    pub base_model: BaseModel,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct BaseModelsQuery {
    #[serde(rename = "type")]
    pub model_type: ModelType,
}

/// Request to associate a batch of models with a scheme
#[derive(Debug, Serialize, Deserialize)]
pub struct AssociateRequest {
    pub model_ids: Vec<String>,

    /// Defaults to the configured `default_priority`
    #[serde(default)]
    pub priority: Option<i64>,

    #[serde(default)]
    pub config: Option<AssociationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisassociateRequest {
    pub model_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisassociateResponse {
    pub removed: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateAssociationRequest {
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub is_enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{mock_associations, mock_models};

    #[test]
    fn test_tags_split_on_commas() {
        let params = ListModelsQuery {
            tags: Some("upper-1, bulk-region,,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.filter().tags,
            vec!["upper-1".to_string(), "bulk-region".to_string()]
        );
    }

    #[test]
    fn test_sort_spec_defaults_to_asc() {
        let params = ListModelsQuery {
            sort: Some("name".to_string()),
            ..Default::default()
        };
        let sort = params.sort_spec().unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);
        assert!(ListModelsQuery::default().sort_spec().is_none());
    }

    #[test]
    fn test_model_row_carries_association() {
        let model = mock_models().remove(0);
        let row = ModelRow::new(model, &mock_associations());

        assert_eq!(row.association.as_ref().map(|a| a.priority), Some(9));
        assert_eq!(row.version_display, "YOLOv8_1");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], "model-1");
        assert_eq!(json["type"], "segmentation");
        assert!(json["training_completed_at"].is_string());
    }
}
