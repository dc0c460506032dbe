//! Model registry for tracking model records

use super::metadata::{MetadataPatch, ModelMetadata};
use super::validation::is_model_name_duplicate;
use super::version::{BaseModel, next_version, timestamp_version};
use crate::error::{ManagerError, ManagerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Kind of model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    #[default]
    Segmentation,
    Detection,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Segmentation => write!(f, "segmentation"),
            Self::Detection => write!(f, "detection"),
        }
    }
}

/// Lifecycle status of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    /// Model is in use
    #[default]
    Active,
    /// Model is kept for reference only
    Archived,
    /// Model should no longer be used
    Deprecated,
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
            Self::Deprecated => write!(f, "deprecated"),
        }
    }
}

/// A trained model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Opaque unique id, immutable
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub version: String,
    /// Last modification time
    pub timestamp: DateTime<Utc>,
    pub tags: Vec<String>,
    pub status: ModelStatus,
    pub metadata: ModelMetadata,
}

/// Create/update form submission
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelFormData {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ModelStatus,
    #[serde(default)]
    pub metadata: MetadataPatch,
    /// Explicit legacy version (`v1.2.3`); checked by the validator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Stamp the next `{base}_{seq}` version instead of a timestamp version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_model: Option<BaseModel>,
}

/// How a create/update chooses the new version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStamp {
    /// Use the submitted version as-is
    Explicit(String),
    /// Next sequence for the base model across the registry
    Sequence(BaseModel),
    /// Legacy `vYYYY.MM.DD.HHmm` stamp of the write time
    Timestamp,
}

impl VersionStamp {
    pub fn for_form(form: &ModelFormData) -> Self {
        match (&form.version, form.base_model) {
            (Some(version), _) => Self::Explicit(version.clone()),
            (None, Some(base)) => Self::Sequence(base),
            (None, None) => Self::Timestamp,
        }
    }

    fn resolve(&self, models: &[Model], now: DateTime<Utc>) -> String {
        match self {
            Self::Explicit(version) => version.clone(),
            Self::Sequence(base) => next_version(*base, models.iter().map(|m| &m.version)),
            Self::Timestamp => timestamp_version(now),
        }
    }
}

/// Registry of model records
///
/// Records are kept in registry order; new records are placed first.
pub struct ModelRegistry {
    models: Arc<RwLock<Vec<Model>>>,
    max_models: Option<usize>,
}

impl ModelRegistry {
    /// Create a new empty registry
    pub fn new(max_models: Option<usize>) -> Self {
        Self::with_models(Vec::new(), max_models)
    }

    /// Create a registry holding `models` in the given order
    pub fn with_models(models: Vec<Model>, max_models: Option<usize>) -> Self {
        Self {
            models: Arc::new(RwLock::new(models)),
            max_models,
        }
    }

    /// Create a model from a validated form
    ///
    /// Missing size/accuracy/framework default to 0/0/"".
    pub async fn create(&self, form: ModelFormData) -> ManagerResult<Model> {
        let mut models = self.models.write().await;

        if let Some(max) = self.max_models
            && models.len() >= max
        {
            return Err(ManagerError::CapacityExceeded { max });
        }

        let now = Utc::now();
        let version = VersionStamp::for_form(&form).resolve(&models, now);

        let model = Model {
            id: uuid::Uuid::new_v4().to_string(),
            name: form.name,
            model_type: form.model_type,
            version,
            timestamp: now,
            tags: form.tags,
            status: form.status,
            metadata: form.metadata.into_metadata(),
        };

        models.insert(0, model.clone());

        tracing::info!(
            model_id = %model.id,
            name = %model.name,
            version = %model.version,
            "Model created"
        );

        Ok(model)
    }

    /// Update a model from a validated form
    ///
    /// Metadata provided by the form is merged over the stored metadata; the
    /// version and timestamp are re-stamped.
    pub async fn update(&self, id: &str, form: ModelFormData) -> ManagerResult<Model> {
        let mut models = self.models.write().await;

        let now = Utc::now();
        let version = VersionStamp::for_form(&form).resolve(&models, now);

        let entry = models
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ManagerError::ModelNotFound { id: id.to_string() })?;

        entry.name = form.name;
        entry.model_type = form.model_type;
        entry.tags = form.tags;
        entry.status = form.status;
        entry.version = version;
        entry.timestamp = now;
        form.metadata.apply_to(&mut entry.metadata);

        tracing::info!(model_id = %id, version = %entry.version, "Model updated");

        Ok(entry.clone())
    }

    /// Remove a model and return it
    pub async fn delete(&self, id: &str) -> ManagerResult<Model> {
        let mut models = self.models.write().await;

        let index = models
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| ManagerError::ModelNotFound { id: id.to_string() })?;

        let removed = models.remove(index);
        tracing::info!(model_id = %id, name = %removed.name, "Model deleted");

        Ok(removed)
    }

    /// Get a model by ID
    pub async fn get(&self, id: &str) -> Option<Model> {
        let models = self.models.read().await;
        models.iter().find(|m| m.id == id).cloned()
    }

    /// List all models in registry order
    pub async fn list(&self) -> Vec<Model> {
        self.models.read().await.clone()
    }

    /// Check if a model is in the registry
    pub async fn contains(&self, id: &str) -> bool {
        let models = self.models.read().await;
        models.iter().any(|m| m.id == id)
    }

    /// Run `write` while holding the read lock, after checking that every id exists
    ///
    /// Deletes wait for the lock, so nothing `write` records about these ids
    /// can outlive them unnoticed.
    pub async fn with_existing<T, F, Fut>(&self, ids: &[String], write: F) -> ManagerResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ManagerResult<T>>,
    {
        let models = self.models.read().await;

        if let Some(missing) = ids.iter().find(|id| !models.iter().any(|m| &m.id == *id)) {
            return Err(ManagerError::ModelNotFound {
                id: missing.clone(),
            });
        }

        let result = write().await;
        drop(models);
        result
    }

    /// Get count of models in registry
    pub async fn count(&self) -> usize {
        self.models.read().await.len()
    }

    /// All version strings currently in use
    pub async fn versions(&self) -> Vec<String> {
        let models = self.models.read().await;
        models.iter().map(|m| m.version.clone()).collect()
    }

    /// Advisory duplicate-name check, see [`is_model_name_duplicate`]
    pub async fn is_name_duplicate(&self, name: &str, exclude_id: Option<&str>) -> bool {
        let models = self.models.read().await;
        is_model_name_duplicate(name, &models, exclude_id)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}
