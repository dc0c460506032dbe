//! Scheme registry
//!
//! Owns schemes and their association rows. `SchemeView::associated_models`
//! is recomputed from the association rows on every read, so it can never
//! drift from them.

use super::association::{
    Association, AssociationConfig, associated_model_ids, find_association_mut, remove_associations,
    replace_associations,
};
use crate::error::{ManagerError, ManagerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Named configuration profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Conventionally at most one scheme is active
    pub is_active: bool,
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scheme plus its derived list of enabled model ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeView {
    #[serde(flatten)]
    pub scheme: Scheme,
    /// Enabled associations, highest priority first
    pub associated_models: Vec<String>,
}

#[derive(Default)]
struct SchemeState {
    schemes: Vec<Scheme>,
    associations: Vec<Association>,
}

impl SchemeState {
    fn view(&self, scheme: &Scheme) -> SchemeView {
        SchemeView {
            scheme: scheme.clone(),
            associated_models: associated_model_ids(&self.associations, &scheme.id),
        }
    }

    fn scheme_mut(&mut self, id: &str) -> ManagerResult<&mut Scheme> {
        self.schemes
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ManagerError::SchemeNotFound { id: id.to_string() })
    }

    fn touch(&mut self, id: &str, now: DateTime<Utc>) -> ManagerResult<()> {
        self.scheme_mut(id)?.updated_at = now;
        Ok(())
    }
}

/// Registry of schemes and model associations
pub struct SchemeRegistry {
    state: Arc<RwLock<SchemeState>>,
}

impl SchemeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::with_data(Vec::new(), Vec::new())
    }

    /// Create a registry from existing schemes and associations
    pub fn with_data(schemes: Vec<Scheme>, associations: Vec<Association>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SchemeState {
                schemes,
                associations,
            })),
        }
    }

    /// List all schemes
    pub async fn list_schemes(&self) -> Vec<SchemeView> {
        let state = self.state.read().await;
        state.schemes.iter().map(|s| state.view(s)).collect()
    }

    /// Get a scheme by ID
    pub async fn get_scheme(&self, id: &str) -> Option<SchemeView> {
        let state = self.state.read().await;
        state
            .schemes
            .iter()
            .find(|s| s.id == id)
            .map(|s| state.view(s))
    }

    pub async fn contains_scheme(&self, id: &str) -> bool {
        let state = self.state.read().await;
        state.schemes.iter().any(|s| s.id == id)
    }

    /// First scheme flagged active
    pub async fn active_scheme(&self) -> Option<SchemeView> {
        let state = self.state.read().await;
        state
            .schemes
            .iter()
            .find(|s| s.is_active)
            .map(|s| state.view(s))
    }

    /// Make `id` the active scheme and clear the flag everywhere else
    pub async fn activate(&self, id: &str) -> ManagerResult<SchemeView> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        state.scheme_mut(id)?;
        for scheme in state.schemes.iter_mut() {
            let active = scheme.id == id;
            if scheme.is_active != active {
                scheme.is_active = active;
                scheme.updated_at = now;
            }
        }

        tracing::info!(scheme_id = %id, "Scheme activated");

        let scheme = state.scheme_mut(id)?.clone();
        Ok(state.view(&scheme))
    }

    /// Association rows of a scheme in insertion order
    pub async fn associations_for(&self, scheme_id: &str) -> ManagerResult<Vec<Association>> {
        let state = self.state.read().await;

        if !state.schemes.iter().any(|s| s.id == scheme_id) {
            return Err(ManagerError::SchemeNotFound {
                id: scheme_id.to_string(),
            });
        }

        Ok(state
            .associations
            .iter()
            .filter(|a| a.scheme_id == scheme_id)
            .cloned()
            .collect())
    }

    /// Associate models with a scheme, replacing existing rows per pair
    ///
    /// `priority` must already be range-checked. Model existence is the
    /// caller's concern.
    pub async fn associate(
        &self,
        scheme_id: &str,
        model_ids: &[String],
        priority: u8,
        config: Option<AssociationConfig>,
    ) -> ManagerResult<Vec<Association>> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        state.touch(scheme_id, now)?;
        let written = replace_associations(
            &mut state.associations,
            scheme_id,
            model_ids,
            priority,
            config.as_ref(),
            now,
        );

        tracing::info!(
            scheme_id = %scheme_id,
            count = written.len(),
            priority,
            "Models associated"
        );

        Ok(written)
    }

    /// Remove associations of `model_ids` from a scheme
    pub async fn disassociate(&self, scheme_id: &str, model_ids: &[String]) -> ManagerResult<usize> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        state.touch(scheme_id, now)?;
        let removed = remove_associations(&mut state.associations, scheme_id, model_ids);

        tracing::info!(scheme_id = %scheme_id, removed, "Models disassociated");

        Ok(removed)
    }

    /// Change the priority of an existing association
    pub async fn update_priority(
        &self,
        scheme_id: &str,
        model_id: &str,
        priority: u8,
    ) -> ManagerResult<Association> {
        self.modify(scheme_id, model_id, |a| a.priority = priority)
            .await
    }

    /// Enable or disable an existing association
    pub async fn set_enabled(
        &self,
        scheme_id: &str,
        model_id: &str,
        enabled: bool,
    ) -> ManagerResult<Association> {
        self.modify(scheme_id, model_id, |a| a.is_enabled = enabled)
            .await
    }

    /// Apply a priority and/or enabled change to one association in a single write
    pub async fn update_association(
        &self,
        scheme_id: &str,
        model_id: &str,
        priority: Option<u8>,
        enabled: Option<bool>,
    ) -> ManagerResult<Association> {
        self.modify(scheme_id, model_id, |a| {
            if let Some(priority) = priority {
                a.priority = priority;
            }
            if let Some(enabled) = enabled {
                a.is_enabled = enabled;
            }
        })
        .await
    }

    async fn modify<F>(&self, scheme_id: &str, model_id: &str, apply: F) -> ManagerResult<Association>
    where
        F: FnOnce(&mut Association),
    {
        let mut guard = self.state.write().await;
        let SchemeState {
            schemes,
            associations,
        } = &mut *guard;

        // Resolve both rows before touching either
        let scheme = schemes
            .iter_mut()
            .find(|s| s.id == scheme_id)
            .ok_or_else(|| ManagerError::SchemeNotFound {
                id: scheme_id.to_string(),
            })?;
        let association = find_association_mut(associations, scheme_id, model_id).ok_or_else(
            || ManagerError::AssociationNotFound {
                scheme_id: scheme_id.to_string(),
                model_id: model_id.to_string(),
            },
        )?;

        apply(association);
        scheme.updated_at = Utc::now();

        tracing::debug!(
            scheme_id = %scheme_id,
            model_id = %model_id,
            priority = association.priority,
            enabled = association.is_enabled,
            "Association updated"
        );

        Ok(association.clone())
    }

    /// Drop every association of a deleted model; returns the number removed
    pub async fn remove_model(&self, model_id: &str) -> usize {
        let mut state = self.state.write().await;
        let before = state.associations.len();
        state.associations.retain(|a| a.model_id != model_id);
        before - state.associations.len()
    }

    /// Total association rows across all schemes
    pub async fn association_count(&self) -> usize {
        self.state.read().await.associations.len()
    }
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{mock_associations, mock_schemes};

    fn seeded() -> SchemeRegistry {
        SchemeRegistry::with_data(mock_schemes(), mock_associations())
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_new_registry() {
        let registry = SchemeRegistry::new();
        assert!(registry.list_schemes().await.is_empty());
        assert!(registry.active_scheme().await.is_none());
    }

    #[tokio::test]
    async fn test_associated_models_are_derived() {
        let registry = seeded();
        let scheme = registry.get_scheme("scheme-1").await.unwrap();
        assert_eq!(scheme.associated_models, ids(&["model-1", "model-3"]));
    }

    #[tokio::test]
    async fn test_active_scheme() {
        let registry = seeded();
        let active = registry.active_scheme().await.unwrap();
        assert_eq!(active.scheme.id, "scheme-1");
    }

    #[tokio::test]
    async fn test_activate_clears_others() {
        let registry = seeded();
        let view = registry.activate("scheme-2").await.unwrap();
        assert!(view.scheme.is_active);

        let active: Vec<_> = registry
            .list_schemes()
            .await
            .into_iter()
            .filter(|s| s.scheme.is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].scheme.id, "scheme-2");
    }

    #[tokio::test]
    async fn test_activate_unknown_scheme() {
        let registry = seeded();
        assert!(matches!(
            registry.activate("scheme-x").await,
            Err(ManagerError::SchemeNotFound { .. })
        ));
        // Nothing changed
        assert_eq!(registry.active_scheme().await.unwrap().scheme.id, "scheme-1");
    }

    #[tokio::test]
    async fn test_associate_twice_keeps_latest_priority() {
        let registry = seeded();
        registry
            .associate("scheme-2", &ids(&["model-5"]), 3, None)
            .await
            .unwrap();
        registry
            .associate("scheme-2", &ids(&["model-5"]), 8, None)
            .await
            .unwrap();

        let rows = registry.associations_for("scheme-2").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].model_id, "model-5");
        assert_eq!(rows[0].priority, 8);
    }

    #[tokio::test]
    async fn test_associate_updates_derived_view() {
        let registry = seeded();
        registry
            .associate("scheme-1", &ids(&["model-7"]), 10, None)
            .await
            .unwrap();

        let scheme = registry.get_scheme("scheme-1").await.unwrap();
        assert_eq!(scheme.associated_models[0], "model-7");
        assert_eq!(scheme.associated_models.len(), 3);
    }

    #[tokio::test]
    async fn test_associate_unknown_scheme() {
        let registry = seeded();
        let result = registry
            .associate("scheme-x", &ids(&["model-1"]), 5, None)
            .await;
        assert!(matches!(result, Err(ManagerError::SchemeNotFound { .. })));
        assert_eq!(registry.association_count().await, 3);
    }

    #[tokio::test]
    async fn test_associate_keeps_config() {
        let registry = seeded();
        let config = AssociationConfig {
            weight: Some(0.5),
            threshold: Some(0.6),
            notes: Some("fallback".to_string()),
        };
        let written = registry
            .associate("scheme-3", &ids(&["model-2"]), 4, Some(config.clone()))
            .await
            .unwrap();
        assert_eq!(written[0].config, Some(config));
    }

    #[tokio::test]
    async fn test_disassociate() {
        let registry = seeded();
        let removed = registry
            .disassociate("scheme-1", &ids(&["model-1", "model-6", "model-8"]))
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let scheme = registry.get_scheme("scheme-1").await.unwrap();
        assert_eq!(scheme.associated_models, ids(&["model-3"]));
    }

    #[tokio::test]
    async fn test_update_priority_reorders_view() {
        let registry = seeded();
        let updated = registry
            .update_priority("scheme-1", "model-3", 10)
            .await
            .unwrap();
        assert_eq!(updated.priority, 10);

        let scheme = registry.get_scheme("scheme-1").await.unwrap();
        assert_eq!(scheme.associated_models, ids(&["model-3", "model-1"]));
    }

    #[tokio::test]
    async fn test_set_enabled() {
        let registry = seeded();
        registry
            .set_enabled("scheme-1", "model-6", true)
            .await
            .unwrap();
        let scheme = registry.get_scheme("scheme-1").await.unwrap();
        assert!(scheme.associated_models.contains(&"model-6".to_string()));
    }

    #[tokio::test]
    async fn test_modify_missing_association() {
        let registry = seeded();
        let result = registry.update_priority("scheme-1", "model-2", 5).await;
        assert!(matches!(
            result,
            Err(ManagerError::AssociationNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_modify_leaves_scheme_untouched() {
        let registry = seeded();
        let before = registry.get_scheme("scheme-1").await.unwrap();

        assert!(
            registry
                .update_priority("scheme-1", "model-2", 5)
                .await
                .is_err()
        );
        assert!(
            registry
                .set_enabled("scheme-1", "model-2", false)
                .await
                .is_err()
        );

        let after = registry.get_scheme("scheme-1").await.unwrap();
        assert_eq!(after.scheme.updated_at, before.scheme.updated_at);
    }

    #[tokio::test]
    async fn test_update_association_applies_both_fields() {
        let registry = seeded();
        let updated = registry
            .update_association("scheme-1", "model-6", Some(10), Some(true))
            .await
            .unwrap();
        assert_eq!(updated.priority, 10);
        assert!(updated.is_enabled);

        let scheme = registry.get_scheme("scheme-1").await.unwrap();
        assert_eq!(scheme.associated_models, ids(&["model-6", "model-1", "model-3"]));
    }

    #[tokio::test]
    async fn test_update_association_unknown_pair_writes_nothing() {
        let registry = seeded();
        let before = registry.associations_for("scheme-1").await.unwrap();

        let result = registry
            .update_association("scheme-1", "model-2", Some(1), Some(false))
            .await;

        assert!(matches!(
            result,
            Err(ManagerError::AssociationNotFound { .. })
        ));
        let after = registry.associations_for("scheme-1").await.unwrap();
        assert_eq!(
            after.iter().map(|a| (a.priority, a.is_enabled)).collect::<Vec<_>>(),
            before.iter().map(|a| (a.priority, a.is_enabled)).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_remove_model_cascades() {
        let registry = seeded();
        registry
            .associate("scheme-2", &ids(&["model-1"]), 5, None)
            .await
            .unwrap();

        let removed = registry.remove_model("model-1").await;

        assert_eq!(removed, 2);
        let scheme = registry.get_scheme("scheme-1").await.unwrap();
        assert!(!scheme.associated_models.contains(&"model-1".to_string()));
    }

    #[test]
    fn test_scheme_view_serializes_flat() {
        let view = SchemeView {
            scheme: mock_schemes().remove(0),
            associated_models: ids(&["model-1"]),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], "scheme-1");
        assert_eq!(json["associated_models"][0], "model-1");
        assert!(json.get("scheme").is_none());
    }
}
