use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_database::{AppState, Query, Store};
use shared_models::error::AppError;
use shared_utils::extractor::parse_object_id;

use crate::descriptor::EntityDescriptor;

/// Generic CRUD over one catalog entity, driven entirely by its
/// descriptor. All entities share the same pipeline: required-field
/// check, reference validation, then the store call.
pub struct CatalogService {
    state: Arc<AppState>,
}

impl CatalogService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn create(
        &self,
        entity: &EntityDescriptor,
        payload: Value,
    ) -> Result<Value, AppError> {
        let object = as_object(&payload)?;

        for field in entity.required_fields {
            if !has_value(object, field) {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
        }
        self.check_references(entity, object).await?;

        let doc = self.state.store.insert(entity.collection, payload).await?;
        info!("Created {} {}", entity.label, doc["id"]);
        Ok(doc)
    }

    pub async fn list(
        &self,
        entity: &EntityDescriptor,
        search: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Vec<Value>, AppError> {
        let mut query = Query::new().sort_desc("createdAt");
        if entity.has_active_flag {
            if let Some(active) = is_active {
                query = query.eq("isActive", json!(active));
            }
        }

        let mut docs = self.state.store.find(entity.collection, &query).await?;

        if let Some(search) = search {
            let pattern = search_pattern(search)?;
            docs.retain(|doc| {
                entity.search_fields.iter().any(|field| {
                    doc.get(*field)
                        .and_then(Value::as_str)
                        .is_some_and(|text| pattern.is_match(text))
                })
            });
        }
        Ok(docs)
    }

    pub async fn get(&self, entity: &EntityDescriptor, id: Uuid) -> Result<Value, AppError> {
        self.state
            .store
            .get(entity.collection, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found", entity.label)))
    }

    pub async fn update(
        &self,
        entity: &EntityDescriptor,
        id: Uuid,
        patch: Value,
    ) -> Result<Value, AppError> {
        let object = as_object(&patch)?;

        // Required fields may be omitted from a patch but not blanked out.
        for field in entity.required_fields {
            if object.contains_key(*field) && !has_value(object, field) {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
        }
        self.check_references(entity, object).await?;

        self.get(entity, id).await?;
        let doc = self.state.store.update(entity.collection, id, patch).await?;
        Ok(doc)
    }

    pub async fn delete(&self, entity: &EntityDescriptor, id: Uuid) -> Result<(), AppError> {
        self.get(entity, id).await?;

        if let Some(guard) = &entity.delete_guard {
            let in_use = self
                .state
                .store
                .count(guard.collection, &Query::new().eq(guard.field, json!(id)))
                .await?;
            if in_use > 0 {
                return Err(AppError::Validation(guard.message.to_string()));
            }
        }

        self.state.store.delete(entity.collection, id).await?;
        info!("Deleted {} {}", entity.label, id);
        Ok(())
    }

    async fn check_references(
        &self,
        entity: &EntityDescriptor,
        object: &serde_json::Map<String, Value>,
    ) -> Result<(), AppError> {
        for reference in entity.references {
            let Some(value) = object.get(reference.field) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let raw = value.as_str().ok_or_else(|| {
                AppError::InvalidId(reference.field.to_string())
            })?;
            let id = parse_object_id(reference.field, raw)?;
            self.state
                .store
                .get(reference.collection, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("{} not found", reference.label)))?;
        }
        Ok(())
    }
}

fn as_object(payload: &Value) -> Result<&serde_json::Map<String, Value>, AppError> {
    payload
        .as_object()
        .ok_or_else(|| AppError::Validation("Request body must be a JSON object".to_string()))
}

fn has_value(object: &serde_json::Map<String, Value>, field: &str) -> bool {
    match object.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Case-insensitive substring match on the escaped search term, the
/// usual "search box" semantics.
fn search_pattern(term: &str) -> Result<Regex, AppError> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::Internal(format!("Search pattern: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_value_rejects_blank_strings() {
        let object = json!({"name": "  ", "count": 0, "gone": null});
        let object = object.as_object().unwrap();
        assert!(!has_value(object, "name"));
        assert!(!has_value(object, "gone"));
        assert!(!has_value(object, "missing"));
        assert!(has_value(object, "count"));
    }

    #[test]
    fn search_pattern_escapes_metacharacters() {
        let pattern = search_pattern("c++ (advanced)").unwrap();
        assert!(pattern.is_match("Intro to C++ (Advanced) track"));
        assert!(!pattern.is_match("c plus plus"));
    }
}
