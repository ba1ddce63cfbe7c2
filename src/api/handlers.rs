use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::Session;
use crate::entities::EntityKind;
use crate::store::{Document, HistoryEntry, ListFilter};
use crate::workflow::WorkflowError;

use super::response::{ActionResponse, ValidatedJson, ValidatedQuery};
use super::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

fn parse_id(kind: EntityKind, raw: &str) -> Result<Uuid, WorkflowError> {
    // An unparseable id cannot name a stored record
    Uuid::parse_str(raw).map_err(|_| WorkflowError::NotFound {
        collection: kind.collection().to_string(),
        id: Uuid::nil(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn list(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Extension(session): Extension<Session>,
    ValidatedQuery(filter): ValidatedQuery<ListFilter>,
) -> Result<Json<Vec<Document>>, WorkflowError> {
    let kind: EntityKind = entity.parse()?;
    let documents = state.engine.list(kind, &filter, &session).await?;
    Ok(Json(documents.as_ref().clone()))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Extension(session): Extension<Session>,
) -> Result<Json<Document>, WorkflowError> {
    let kind: EntityKind = entity.parse()?;
    let id = parse_id(kind, &id)?;
    Ok(Json(state.engine.get(kind, id, &session).await?))
}

pub async fn history(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<HistoryEntry>>, WorkflowError> {
    let kind: EntityKind = entity.parse()?;
    let id = parse_id(kind, &id)?;
    Ok(Json(state.engine.history(kind, id, &session).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<Value>,
) -> Result<(StatusCode, Json<ActionResponse>), WorkflowError> {
    let kind: EntityKind = entity.parse()?;
    let document = state.engine.create(kind, &session, payload).await?;
    Ok((StatusCode::CREATED, Json(ActionResponse::created(document.id))))
}

pub async fn transition(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Extension(session): Extension<Session>,
    ValidatedJson(request): ValidatedJson<TransitionRequest>,
) -> Result<Json<ActionResponse>, WorkflowError> {
    let kind: EntityKind = entity.parse()?;
    let id = parse_id(kind, &id)?;
    let document = state
        .engine
        .transition(kind, id, &request.status, &session)
        .await?;
    Ok(Json(ActionResponse::success(document.status())))
}
