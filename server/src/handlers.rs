//! Route handlers. Each one validates its input, issues at most one store
//! call, and converts the outcome into a response.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyze::{Analysis, AnalyzeRequest};
use crate::error::ServiceError;
use crate::model::{CreateItem, Item};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ServiceError> {
    let items = state.store.list_items().await?;
    debug!(count = items.len(), "listed items");
    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Item>, ServiceError> {
    let Path(id) = id.map_err(|rejection| ServiceError::InvalidPath {
        field: "id".to_string(),
        message: rejection.body_text(),
    })?;
    state
        .store
        .find_item(id)
        .await?
        .map(Json)
        .ok_or(ServiceError::NotFound { id })
}

pub async fn create_item(
    State(state): State<AppState>,
    input: Result<Json<CreateItem>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ServiceError> {
    let Json(input) = input.map_err(body_error)?;
    let new_item = input.validate()?;
    let item = state.store.insert_item(&new_item).await?;
    info!(id = item.id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn analyze(
    State(state): State<AppState>,
    input: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Analysis>, ServiceError> {
    let Json(input) = input.map_err(body_error)?;
    let image_path = match input.image_path {
        Some(path) if !path.trim().is_empty() => path,
        Some(_) => return Err(ServiceError::validation("image_path", "must not be blank")),
        None => return Err(ServiceError::validation("image_path", "is required")),
    };
    let analysis = state.analyzer.analyze(&image_path);
    info!(%image_path, success = analysis.success, "image analyzed");
    Ok(Json(analysis))
}

fn body_error(rejection: JsonRejection) -> ServiceError {
    ServiceError::validation("body", rejection.body_text())
}
