//! Traffic annotation routes: cURL parsing, field analysis sessions,
//! annotations and CSV export.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::models::field::{FieldAnnotation, FieldRecord};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::traffic::{CapturedResponse, ParsedRequest};
use crate::parsers::parse_curl;
use crate::services::field_inventory::build_inventory;
use crate::services::session::{AnalysisSession, FieldFilters, SessionSummary};
use crate::AppState;

/// Request body carrying a pasted cURL command.
#[derive(Debug, Deserialize, Validate)]
pub struct ParseCurlRequest {
    #[validate(length(min = 1, max = 65536))]
    pub curl: String,
}

/// Request body pairing a cURL command with the response it produced.
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, max = 65536))]
    pub curl: String,
    pub response: CapturedResponse,
}

#[derive(Debug, Serialize)]
pub struct DeletedSession {
    pub id: Uuid,
}

/// POST /api/v1/traffic/parse: interpret a cURL command without storing anything.
pub async fn parse(
    Json(body): Json<ParseCurlRequest>,
) -> Result<Json<ApiResponse<ParsedRequest>>, AppError> {
    body.validate()?;
    let parsed = parse_curl(&body.curl)?;
    Ok(ApiResponse::success(parsed))
}

/// POST /api/v1/traffic/analyze: build a field inventory and open a session.
pub async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisSession>>, AppError> {
    body.validate()?;
    let request = parse_curl(&body.curl)?;
    let inventory = build_inventory(
        &request,
        &body.response,
        &state.inventory_options(),
        state.classifier.as_ref(),
    );
    let session = state.sessions.create(request, body.response, inventory)?;
    Ok(ApiResponse::success(session))
}

/// GET /api/v1/traffic/sessions: list sessions, newest first.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SessionSummary>>>, AppError> {
    let sessions = state.sessions.list()?;
    Ok(ApiResponse::success(sessions))
}

/// GET /api/v1/traffic/sessions/:id: full session with inventory.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnalysisSession>>, AppError> {
    let session = state.sessions.get(id)?;
    Ok(ApiResponse::success(session))
}

/// DELETE /api/v1/traffic/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedSession>>, AppError> {
    state.sessions.delete(id)?;
    Ok(ApiResponse::success(DeletedSession { id }))
}

/// GET /api/v1/traffic/sessions/:id/fields: filtered, paginated field list.
pub async fn list_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<FieldFilters>,
) -> Result<Json<ApiResponse<PagedResult<FieldRecord>>>, AppError> {
    let result = state.sessions.list_fields(id, &filters, &pagination)?;
    Ok(ApiResponse::success(result))
}

/// PUT /api/v1/traffic/sessions/:id/fields/:field_id/annotation
pub async fn annotate(
    State(state): State<AppState>,
    Path((id, field_id)): Path<(Uuid, String)>,
    Json(body): Json<FieldAnnotation>,
) -> Result<Json<ApiResponse<FieldRecord>>, AppError> {
    let field = state.sessions.annotate(id, &field_id, body)?;
    Ok(ApiResponse::success(field))
}

/// GET /api/v1/traffic/sessions/:id/export: annotated inventory as CSV.
pub async fn export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let csv = state.sessions.export_csv(id)?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"session-{id}.csv\""),
        ),
    ];
    Ok((headers, csv))
}
