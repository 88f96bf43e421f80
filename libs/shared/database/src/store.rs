use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

/// Storage-layer failures. `From<StoreError> for AppError` below is the
/// error classifier: it decides the HTTP status and client message for
/// everything the persistence layer can throw.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{}", messages.join(", "))]
    Validation { messages: Vec<String> },

    #[error("Duplicate value for field: {field}")]
    Duplicate { field: String },

    #[error("Invalid ID format for {field}")]
    InvalidId { field: String },

    #[error("Document not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation { messages } => AppError::Validation(messages.join(", ")),
            StoreError::Duplicate { field } => {
                AppError::Conflict(format!("Duplicate value for field: {}", field))
            }
            StoreError::InvalidId { field } => AppError::InvalidId(field),
            StoreError::NotFound => AppError::NotFound("Resource not found".to_string()),
            StoreError::Internal(detail) => AppError::Internal(detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Half-open timestamp window `[from, to)` on a document field.
#[derive(Debug, Clone)]
pub struct DateRange {
    pub field: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Equality filters plus an optional date range and sort key. Deliberately
/// minimal: this is all the controllers ever needed.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub range: Option<DateRange>,
    pub sort: Option<(String, SortOrder)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push((field.into(), value));
        self
    }

    pub fn between(
        mut self,
        field: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        self.range = Some(DateRange {
            field: field.into(),
            from,
            to,
        });
        self
    }

    pub fn sort_asc(mut self, field: impl Into<String>) -> Self {
        self.sort = Some((field.into(), SortOrder::Asc));
        self
    }

    pub fn sort_desc(mut self, field: impl Into<String>) -> Self {
        self.sort = Some((field.into(), SortOrder::Desc));
        self
    }
}

/// Named collections of JSON documents with per-document atomic writes.
/// No multi-document transactions: check-then-insert sequences are not
/// isolated, matching the persistence guarantees the API is written against.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a document. The store assigns `id` and sets `createdAt` and
    /// `updatedAt`; unique-key violations fail with `Duplicate`.
    async fn insert(&self, collection: &str, doc: Value) -> Result<Value, StoreError>;

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError>;

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Merge `patch` into the document and bump `updatedAt`, atomically.
    /// Fails with `NotFound` if the id is absent.
    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> Result<Value, StoreError>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;

    async fn count(&self, collection: &str, query: &Query) -> Result<u64, StoreError>;
}

/// Collection names, registered once at process start.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ADMINS: &str = "admins";
    pub const BOOKINGS: &str = "bookings";
    pub const DOCTORS: &str = "doctors";
    pub const DOCTOR_CATEGORIES: &str = "doctor_categories";
    pub const HEALTHCARE_CENTERS: &str = "healthcare_centers";
    pub const HEALTH_CATEGORIES: &str = "health_categories";
    pub const JOBS: &str = "jobs";
    pub const JOB_CATEGORIES: &str = "job_categories";
    pub const JOB_APPLICATIONS: &str = "job_applications";
    pub const COURSES: &str = "courses";
    pub const COURSE_CATEGORIES: &str = "course_categories";
    pub const COURSE_REGISTRATIONS: &str = "course_registrations";
    pub const BLOGS: &str = "blogs";
}
