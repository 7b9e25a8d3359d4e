//! Risk catalog routes: entities, risks and governance groups.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::models::catalog::{Entity, GovernanceGroup, Risk};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::catalog::{EntityFilters, GovernanceFilters, RiskFilters};
use crate::AppState;

/// GET /api/v1/entities: list entities with filters and pagination.
pub async fn list_entities(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<EntityFilters>,
) -> Result<Json<ApiResponse<PagedResult<Entity>>>, AppError> {
    let result = state.catalog.list_entities(&filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/entities/:id
pub async fn get_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Entity>>, AppError> {
    let entity = state.catalog.find_entity(&id)?;
    Ok(ApiResponse::success(entity))
}

/// GET /api/v1/risks: list risks with filters and pagination.
pub async fn list_risks(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<RiskFilters>,
) -> Result<Json<ApiResponse<PagedResult<Risk>>>, AppError> {
    let result = state.catalog.list_risks(&filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/risks/:id
pub async fn get_risk(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Risk>>, AppError> {
    let risk = state.catalog.find_risk(&id)?;
    Ok(ApiResponse::success(risk))
}

/// GET /api/v1/risks/:id/entities: entities exposed to a risk.
pub async fn risk_entities(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Entity>>>, AppError> {
    let entities = state.catalog.entities_for_risk(&id)?;
    Ok(ApiResponse::success(entities))
}

/// GET /api/v1/governance-groups: list governance groups with filters and pagination.
pub async fn list_governance_groups(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<GovernanceFilters>,
) -> Result<Json<ApiResponse<PagedResult<GovernanceGroup>>>, AppError> {
    let result = state
        .catalog
        .list_governance_groups(&filters, &pagination)
        .await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/governance-groups/:id
pub async fn get_governance_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<GovernanceGroup>>, AppError> {
    let group = state.catalog.find_governance_group(&id)?;
    Ok(ApiResponse::success(group))
}
