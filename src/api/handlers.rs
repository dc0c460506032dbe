//! API request handlers

use super::models::{
    AssociateRequest, BaseModelsQuery, DisassociateRequest, DisassociateResponse, HealthResponse,
    ListModelsQuery, ListModelsResponse, ModelRow, NextVersionQuery, NextVersionResponse,
    UpdateAssociationRequest, ValidateQuery, ValidateResponse,
};
use super::routes::AppState;
use crate::error::{ManagerError, ManagerResult};
use crate::models::version::{self, VersionOption};
use crate::models::{
    BaseModel, Model, ModelFormData, ModelStats, pin_associated, query, validate_model_form,
};
use crate::schemes::{Association, SchemeView, check_priority};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// GET /health - Manager health check
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now(),
        }),
    )
}

/// GET /metrics - Prometheus metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// GET /models - Filtered, searched and sorted model table
pub async fn list_models(
    State(state): State<AppState>,
    Query(params): Query<ListModelsQuery>,
) -> ManagerResult<Json<ListModelsResponse>> {
    let models = state.models.list().await;
    let sort = params.sort_spec();
    let mut view = query(&models, &params.filter(), sort.as_ref(), params.search_term());

    let associations = match params.scheme.as_deref() {
        Some(scheme_id) => {
            let rows = state.schemes.associations_for(scheme_id).await?;
            view = pin_associated(view, &rows);
            rows
        }
        None => Vec::new(),
    };

    let stats = ModelStats::collect(&models, view.len());

    tracing::debug!(
        total = stats.total,
        filtered = stats.filtered,
        search = %params.search_term(),
        "Model table queried"
    );

    let rows = view
        .into_iter()
        .map(|model| ModelRow::new(model, &associations))
        .collect();

    Ok(Json(ListModelsResponse {
        models: rows,
        stats,
    }))
}

fn reject_invalid(form: &ModelFormData) -> ManagerResult<()> {
    let validation = validate_model_form(form);
    if validation.is_valid {
        return Ok(());
    }

    crate::metrics::record_validation_rejected();
    tracing::warn!(
        name = %form.name,
        fields = ?validation.errors.keys().collect::<Vec<_>>(),
        "Rejected invalid model form"
    );

    Err(ManagerError::Validation {
        errors: validation.errors,
    })
}

/// POST /models - Validate and create a model
pub async fn create_model(
    State(state): State<AppState>,
    Json(form): Json<ModelFormData>,
) -> ManagerResult<(StatusCode, Json<Model>)> {
    reject_invalid(&form)?;

    if state.models.is_name_duplicate(&form.name, None).await {
        tracing::warn!(name = %form.name, "Creating model with a duplicate name");
    }

    state.simulate_latency().await;
    let model = state.models.create(form).await?;

    crate::metrics::record_model_created(&model.model_type.to_string());
    crate::metrics::update_model_count(state.models.count().await);

    Ok((StatusCode::CREATED, Json(model)))
}

/// POST /models/validate - Dry-run the form validator
pub async fn validate_model(
    State(state): State<AppState>,
    Query(params): Query<ValidateQuery>,
    Json(form): Json<ModelFormData>,
) -> Json<ValidateResponse> {
    let name_duplicate = state
        .models
        .is_name_duplicate(&form.name, params.exclude_id.as_deref())
        .await;

    Json(ValidateResponse {
        validation: validate_model_form(&form),
        name_duplicate,
    })
}

/// GET /models/:id - Get a model
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ManagerResult<Json<Model>> {
    state
        .models
        .get(&id)
        .await
        .map(Json)
        .ok_or(ManagerError::ModelNotFound { id })
}

/// PUT /models/:id - Validate and update a model
pub async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ModelFormData>,
) -> ManagerResult<Json<Model>> {
    reject_invalid(&form)?;

    state.simulate_latency().await;
    let model = state.models.update(&id, form).await?;

    crate::metrics::record_model_updated(&model.model_type.to_string());

    Ok(Json(model))
}

/// DELETE /models/:id - Delete a model and its associations
pub async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ManagerResult<StatusCode> {
    state.simulate_latency().await;
    let deleted = state.models.delete(&id).await?;

    let removed = state.schemes.remove_model(&id).await;
    if removed > 0 {
        tracing::info!(model_id = %id, removed, "Removed associations of deleted model");
    }

    crate::metrics::record_model_deleted(&deleted.model_type.to_string());
    crate::metrics::update_model_count(state.models.count().await);

    Ok(StatusCode::NO_CONTENT)
}

/// GET /models/:id/versions - Version picker options
pub async fn version_options(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ManagerResult<Json<Vec<VersionOption>>> {
    let model = state
        .models
        .get(&id)
        .await
        .ok_or(ManagerError::ModelNotFound { id })?;

    Ok(Json(version::generate_version_options(&model)))
}

/// GET /versions/next?base_model= - Next free version for a base model
pub async fn next_version(
    State(state): State<AppState>,
    Query(params): Query<NextVersionQuery>,
) -> ManagerResult<Json<NextVersionResponse>> {
    let base_model: BaseModel =
        params
            .base_model
            .parse()
            .map_err(|_| ManagerError::InvalidBaseModel {
                name: params.base_model.clone(),
            })?;

    let versions = state.models.versions().await;

    Ok(Json(NextVersionResponse {
        base_model,
        version: version::next_version(base_model, &versions),
    }))
}

/// GET /versions/base-models?type= - Base models suggested for a model type
pub async fn recommended_base_models(
    Query(params): Query<BaseModelsQuery>,
) -> Json<&'static [BaseModel]> {
    Json(BaseModel::recommended_for(params.model_type))
}

/// GET /schemes - List schemes
pub async fn list_schemes(State(state): State<AppState>) -> Json<Vec<SchemeView>> {
    Json(state.schemes.list_schemes().await)
}

/// GET /schemes/active - The active scheme
pub async fn active_scheme(State(state): State<AppState>) -> ManagerResult<Json<SchemeView>> {
    state
        .schemes
        .active_scheme()
        .await
        .map(Json)
        .ok_or_else(|| ManagerError::SchemeNotFound {
            id: "active".to_string(),
        })
}

/// GET /schemes/:id - Get a scheme
pub async fn get_scheme(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ManagerResult<Json<SchemeView>> {
    state
        .schemes
        .get_scheme(&id)
        .await
        .map(Json)
        .ok_or(ManagerError::SchemeNotFound { id })
}

/// POST /schemes/:id/activate - Make a scheme the active one
pub async fn activate_scheme(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ManagerResult<Json<SchemeView>> {
    state.simulate_latency().await;
    Ok(Json(state.schemes.activate(&id).await?))
}

/// GET /schemes/:id/associations - Association rows of a scheme
pub async fn list_associations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ManagerResult<Json<Vec<Association>>> {
    Ok(Json(state.schemes.associations_for(&id).await?))
}

/// POST /schemes/:id/associations - Associate a batch of models
pub async fn associate_models(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssociateRequest>,
) -> ManagerResult<Json<Vec<Association>>> {
    if req.model_ids.is_empty() {
        return Err(ManagerError::BadRequest {
            message: "model_ids must not be empty".to_string(),
        });
    }

    let priority = match req.priority {
        Some(priority) => check_priority(priority)?,
        None => state.settings.default_priority,
    };

    state.simulate_latency().await;

    // A concurrent delete cannot land between the existence check and the write
    let written = state
        .models
        .with_existing(&req.model_ids, || {
            state
                .schemes
                .associate(&id, &req.model_ids, priority, req.config)
        })
        .await?;

    crate::metrics::record_models_associated(&id, written.len());

    Ok(Json(written))
}

/// POST /schemes/:id/disassociate - Remove a batch of associations
pub async fn disassociate_models(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DisassociateRequest>,
) -> ManagerResult<Json<DisassociateResponse>> {
    state.simulate_latency().await;
    let removed = state.schemes.disassociate(&id, &req.model_ids).await?;

    crate::metrics::record_models_disassociated(&id, removed);

    Ok(Json(DisassociateResponse { removed }))
}

/// PATCH /schemes/:id/associations/:model_id - Change priority or enabled flag
pub async fn update_association(
    State(state): State<AppState>,
    Path((id, model_id)): Path<(String, String)>,
    Json(req): Json<UpdateAssociationRequest>,
) -> ManagerResult<Json<Association>> {
    let priority = req.priority.map(check_priority).transpose()?;

    if priority.is_none() && req.is_enabled.is_none() {
        return Err(ManagerError::BadRequest {
            message: "Nothing to update: provide priority and/or is_enabled".to_string(),
        });
    }

    state.simulate_latency().await;

    let association = state
        .schemes
        .update_association(&id, &model_id, priority, req.is_enabled)
        .await?;

    Ok(Json(association))
}
