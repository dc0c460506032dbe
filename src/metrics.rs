//! Prometheus metrics

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Setup Prometheus metrics exporter
/// Returns a handle that can be used to retrieve metrics
pub fn setup_metrics() -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    tracing::info!("Prometheus metrics exporter installed");

    Ok(handle)
}

/// Record model creation
pub fn record_model_created(model_type: &str) {
    metrics::counter!("model_manager_models_created_total",
        "type" => model_type.to_string()
    )
    .increment(1);
}

/// Record a model update
pub fn record_model_updated(model_type: &str) {
    metrics::counter!("model_manager_models_updated_total",
        "type" => model_type.to_string()
    )
    .increment(1);
}

/// Record a model deletion
pub fn record_model_deleted(model_type: &str) {
    metrics::counter!("model_manager_models_deleted_total",
        "type" => model_type.to_string()
    )
    .increment(1);
}

/// Record a form submission rejected by validation
pub fn record_validation_rejected() {
    metrics::counter!("model_manager_validation_rejections_total").increment(1);
}

/// Record association writes for a scheme
pub fn record_models_associated(scheme_id: &str, count: usize) {
    metrics::counter!("model_manager_associations_total",
        "scheme" => scheme_id.to_string()
    )
    .increment(count as u64);
}

pub fn record_models_disassociated(scheme_id: &str, count: usize) {
    metrics::counter!("model_manager_disassociations_total",
        "scheme" => scheme_id.to_string()
    )
    .increment(count as u64);
}

/// Update total model count gauge
pub fn update_model_count(count: usize) {
    metrics::gauge!("model_manager_models_count").set(count as f64);
}
