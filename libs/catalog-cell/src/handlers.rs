use std::sync::Arc;

use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use serde_json::Value;

use shared_database::AppState;
use shared_models::envelope::ApiResponse;
use shared_models::error::AppError;
use shared_utils::extractor::parse_object_id;

use crate::descriptor::EntityDescriptor;
use crate::service::CatalogService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub is_active: Option<String>,
}

fn parse_active(raw: Option<&str>) -> Result<Option<bool>, AppError> {
    raw.map(|value| {
        value
            .parse::<bool>()
            .map_err(|_| AppError::Validation("isActive must be true or false".to_string()))
    })
    .transpose()
}

pub async fn create_entity(
    State(state): State<Arc<AppState>>,
    Extension(entity): Extension<EntityDescriptor>,
    Json(payload): Json<Value>,
) -> Result<ApiResponse, AppError> {
    let doc = CatalogService::new(state).create(&entity, payload).await?;
    Ok(ApiResponse::created(
        doc,
        format!("{} created successfully", entity.label),
    ))
}

pub async fn list_entities(
    State(state): State<Arc<AppState>>,
    Extension(entity): Extension<EntityDescriptor>,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse, AppError> {
    let is_active = parse_active(query.is_active.as_deref())?;
    let docs = CatalogService::new(state)
        .list(&entity, query.search.as_deref(), is_active)
        .await?;
    Ok(ApiResponse::ok(
        Value::Array(docs),
        format!("{} retrieved successfully", entity.label_plural),
    ))
}

pub async fn get_entity(
    State(state): State<Arc<AppState>>,
    Extension(entity): Extension<EntityDescriptor>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = parse_object_id("id", &id)?;
    let doc = CatalogService::new(state).get(&entity, id).await?;
    Ok(ApiResponse::ok(
        doc,
        format!("{} retrieved successfully", entity.label),
    ))
}

pub async fn update_entity(
    State(state): State<Arc<AppState>>,
    Extension(entity): Extension<EntityDescriptor>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<ApiResponse, AppError> {
    let id = parse_object_id("id", &id)?;
    let doc = CatalogService::new(state).update(&entity, id, patch).await?;
    Ok(ApiResponse::ok(
        doc,
        format!("{} updated successfully", entity.label),
    ))
}

pub async fn delete_entity(
    State(state): State<Arc<AppState>>,
    Extension(entity): Extension<EntityDescriptor>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = parse_object_id("id", &id)?;
    CatalogService::new(state).delete(&entity, id).await?;
    Ok(ApiResponse::ok(
        Value::Null,
        format!("{} deleted successfully", entity.label),
    ))
}
