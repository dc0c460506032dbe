//! API route definitions

use crate::config::ManagerConfig;
use crate::error::ManagerResult;
use crate::models::ModelRegistry;
use crate::schemes::{SchemeRegistry, check_priority};
use crate::seed;
use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;

/// Per-deployment knobs the handlers need
#[derive(Debug, Clone, Copy)]
pub struct ApiSettings {
    /// Delay applied before each write
    pub simulated_latency: Duration,
    /// Priority for associate requests that omit one
    pub default_priority: u8,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            simulated_latency: Duration::ZERO,
            default_priority: 5,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub models: Arc<ModelRegistry>,
    pub schemes: Arc<SchemeRegistry>,
    pub settings: ApiSettings,
    pub prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    /// Build stores from configuration, seeding demo data when enabled
    pub fn from_config(
        config: &ManagerConfig,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> ManagerResult<Self> {
        let (models, schemes) = if config.seed_mock_data {
            (
                ModelRegistry::with_models(seed::mock_models(), config.max_models),
                SchemeRegistry::with_data(seed::mock_schemes(), seed::mock_associations()),
            )
        } else {
            (ModelRegistry::new(config.max_models), SchemeRegistry::new())
        };

        Ok(Self {
            models: Arc::new(models),
            schemes: Arc::new(schemes),
            settings: ApiSettings {
                simulated_latency: config.simulated_latency(),
                default_priority: check_priority(config.default_priority)?,
            },
            prometheus_handle,
        })
    }

    pub(crate) async fn simulate_latency(&self) {
        if !self.settings.simulated_latency.is_zero() {
            tokio::time::sleep(self.settings.simulated_latency).await;
        }
    }
}

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Models
        .route(
            "/models",
            get(handlers::list_models).post(handlers::create_model),
        )
        .route("/models/validate", post(handlers::validate_model))
        .route(
            "/models/{id}",
            get(handlers::get_model)
                .put(handlers::update_model)
                .delete(handlers::delete_model),
        )
        .route("/models/{id}/versions", get(handlers::version_options))
        // Version codec
        .route("/versions/next", get(handlers::next_version))
        .route("/versions/base-models", get(handlers::recommended_base_models))
        // Schemes and associations
        .route("/schemes", get(handlers::list_schemes))
        .route("/schemes/active", get(handlers::active_scheme))
        .route("/schemes/{id}", get(handlers::get_scheme))
        .route("/schemes/{id}/activate", post(handlers::activate_scheme))
        .route(
            "/schemes/{id}/associations",
            get(handlers::list_associations).post(handlers::associate_models),
        )
        .route(
            "/schemes/{id}/associations/{model_id}",
            patch(handlers::update_association),
        )
        .route("/schemes/{id}/disassociate", post(handlers::disassociate_models))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
