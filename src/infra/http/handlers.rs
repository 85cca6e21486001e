//! Boundary handlers: validate the repository id, delegate to the catalog,
//! shape the result as JSON with a shared-cache hint.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::ports::DocumentQuery;

use super::error::ApiError;
use super::state::ApiState;

/// Five minutes of shared caching with background revalidation.
const CACHE_CONTROL_VALUE: &str = "s-maxage=300, stale-while-revalidate";

fn cacheable_json<T: Serialize>(payload: &T) -> Response {
    ([(header::CACHE_CONTROL, CACHE_CONTROL_VALUE)], Json(payload)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentListParams {
    pub lang: Option<String>,
}

pub async fn list_documents(
    State(state): State<ApiState>,
    Path(repository_id): Path<String>,
    Query(params): Query<DocumentListParams>,
) -> Result<Response, ApiError> {
    let query = DocumentQuery { lang: params.lang };
    let documents = state.catalog.documents(&repository_id, &query).await?;
    Ok(cacheable_json(&documents))
}

pub async fn list_document_types(
    State(state): State<ApiState>,
    Path(repository_id): Path<String>,
) -> Result<Response, ApiError> {
    let types = state.catalog.document_types(&repository_id).await?;
    Ok(cacheable_json(&types))
}

pub async fn list_slices(
    State(state): State<ApiState>,
    Path(repository_id): Path<String>,
) -> Result<Response, ApiError> {
    let slices = state.catalog.slices(&repository_id).await?;
    Ok(cacheable_json(&slices))
}

pub async fn list_repositories(State(state): State<ApiState>) -> Response {
    Json(state.catalog.repositories().await).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRepositoryRequest {
    #[serde(default)]
    pub repository_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddRepositoryResponse {
    pub success: bool,
}

pub async fn add_repository(
    State(state): State<ApiState>,
    Json(payload): Json<AddRepositoryRequest>,
) -> Result<Json<AddRepositoryResponse>, ApiError> {
    let Some(repository_id) = payload.repository_id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::bad_request("Repository ID is required"));
    };

    // Whitespace-only ids are silently ignored by the catalog.
    state.catalog.add_repository(&repository_id).await;
    Ok(Json(AddRepositoryResponse { success: true }))
}

pub async fn health(State(state): State<ApiState>) -> Response {
    match state.cache.get("healthz").await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            warn!(
                target = "vetrina::http",
                error = %err,
                "cache backend health probe failed"
            );
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
