use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::store::{collections, Query, SortOrder, Store, StoreError};

struct Collection {
    unique_fields: Vec<String>,
    docs: HashMap<Uuid, Value>,
}

/// In-process document store. One `RwLock` guards all collections, which
/// gives every insert/update the per-document atomicity the handlers rely
/// on. Cheap to clone; all clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store with every collection the API uses registered, including the
    /// unique keys the entity schemas declare.
    pub async fn with_default_collections() -> Self {
        let store = Self::new();
        store.register(collections::USERS, &["email"]).await;
        store.register(collections::ADMINS, &["email"]).await;
        store.register(collections::BOOKINGS, &[]).await;
        store.register(collections::DOCTORS, &[]).await;
        store
            .register(collections::DOCTOR_CATEGORIES, &["name"])
            .await;
        store.register(collections::HEALTHCARE_CENTERS, &[]).await;
        store
            .register(collections::HEALTH_CATEGORIES, &["name"])
            .await;
        store.register(collections::JOBS, &[]).await;
        store.register(collections::JOB_CATEGORIES, &["name"]).await;
        store.register(collections::JOB_APPLICATIONS, &[]).await;
        store.register(collections::COURSES, &[]).await;
        store
            .register(collections::COURSE_CATEGORIES, &["name"])
            .await;
        store.register(collections::COURSE_REGISTRATIONS, &[]).await;
        store.register(collections::BLOGS, &[]).await;
        store
    }

    pub async fn register(&self, name: &str, unique_fields: &[&str]) {
        let mut inner = self.inner.write().await;
        inner.entry(name.to_string()).or_insert_with(|| Collection {
            unique_fields: unique_fields.iter().map(|f| f.to_string()).collect(),
            docs: HashMap::new(),
        });
        debug!("Registered collection {}", name);
    }

    fn check_unique(
        collection: &Collection,
        doc: &Map<String, Value>,
        exclude: Option<Uuid>,
    ) -> Result<(), StoreError> {
        for field in &collection.unique_fields {
            let Some(candidate) = doc.get(field) else {
                continue;
            };
            if candidate.is_null() {
                continue;
            }
            for (id, existing) in &collection.docs {
                if Some(*id) == exclude {
                    continue;
                }
                if existing.get(field) == Some(candidate) {
                    return Err(StoreError::Duplicate {
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn as_object(doc: Value) -> Result<Map<String, Value>, StoreError> {
        match doc {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Validation {
                messages: vec![format!("Expected a JSON object, got {}", type_name(&other))],
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn matches(doc: &Value, query: &Query) -> bool {
    for (field, expected) in &query.filters {
        if doc.get(field) != Some(expected) {
            return false;
        }
    }
    if let Some(range) = &query.range {
        match timestamp(doc.get(&range.field)) {
            Some(when) => {
                if when < range.from || when >= range.to {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}

fn sort_docs(docs: &mut [Value], field: &str, order: SortOrder) {
    docs.sort_by(|a, b| {
        let ord = match (timestamp(a.get(field)), timestamp(b.get(field))) {
            (Some(left), Some(right)) => left.cmp(&right),
            _ => {
                let left = a.get(field).and_then(Value::as_str).unwrap_or_default();
                let right = b.get(field).and_then(Value::as_str).unwrap_or_default();
                left.cmp(right)
            }
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, collection: &str, doc: Value) -> Result<Value, StoreError> {
        let mut doc = Self::as_object(doc)?;
        let mut inner = self.inner.write().await;
        let collection = inner
            .get_mut(collection)
            .ok_or_else(|| StoreError::Internal(format!("Unknown collection: {}", collection)))?;

        Self::check_unique(collection, &doc, None)?;

        let id = Uuid::new_v4();
        let now = serde_json::to_value(Utc::now())
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        doc.insert("id".to_string(), Value::String(id.to_string()));
        doc.insert("createdAt".to_string(), now.clone());
        doc.insert("updatedAt".to_string(), now);

        let stored = Value::Object(doc);
        collection.docs.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.read().await;
        let collection = inner
            .get(collection)
            .ok_or_else(|| StoreError::Internal(format!("Unknown collection: {}", collection)))?;
        Ok(collection.docs.get(&id).cloned())
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let inner = self.inner.read().await;
        let collection = inner
            .get(collection)
            .ok_or_else(|| StoreError::Internal(format!("Unknown collection: {}", collection)))?;

        let mut results: Vec<Value> = collection
            .docs
            .values()
            .filter(|doc| matches(doc, query))
            .cloned()
            .collect();

        if let Some((field, order)) = &query.sort {
            sort_docs(&mut results, field, *order);
        }
        Ok(results)
    }

    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> Result<Value, StoreError> {
        let mut patch = Self::as_object(patch)?;
        // Repository-maintained fields are never patchable.
        for field in ["id", "createdAt", "updatedAt"] {
            patch.remove(field);
        }
        let mut inner = self.inner.write().await;
        let collection = inner
            .get_mut(collection)
            .ok_or_else(|| StoreError::Internal(format!("Unknown collection: {}", collection)))?;

        let mut merged = match collection.docs.get(&id) {
            Some(Value::Object(existing)) => existing.clone(),
            _ => return Err(StoreError::NotFound),
        };
        for (key, value) in patch {
            merged.insert(key, value);
        }
        merged.insert(
            "updatedAt".to_string(),
            serde_json::to_value(Utc::now()).map_err(|e| StoreError::Internal(e.to_string()))?,
        );

        Self::check_unique(collection, &merged, Some(id))?;

        let stored = Value::Object(merged);
        collection.docs.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let collection = inner
            .get_mut(collection)
            .ok_or_else(|| StoreError::Internal(format!("Unknown collection: {}", collection)))?;
        Ok(collection.docs.remove(&id).is_some())
    }

    async fn count(&self, collection: &str, query: &Query) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        let collection = inner
            .get(collection)
            .ok_or_else(|| StoreError::Internal(format!("Unknown collection: {}", collection)))?;
        Ok(collection
            .docs
            .values()
            .filter(|doc| matches(doc, query))
            .count() as u64)
    }
}
