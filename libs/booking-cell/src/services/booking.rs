use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, TimeZone, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::store::collections;
use shared_database::{AppState, Query, Store};
use shared_models::error::AppError;
use shared_utils::extractor::parse_object_id;

use crate::models::{
    Booking, BookingFor, BookingStats, BookingStatus, BookingView, CreateBookingRequest,
};
use crate::services::lifecycle::BookingLifecycle;

// Projections joined onto booking responses. Listings carry the summary
// shape; single-booking fetches the wider detail shape.
const USER_SUMMARY: &[&str] = &["id", "name", "email"];
const USER_DETAIL: &[&str] = &["id", "name", "email", "contactNumber"];
const DOCTOR_SUMMARY: &[&str] = &["id", "name", "qualification", "specialties"];
const DOCTOR_DETAIL: &[&str] = &[
    "id",
    "name",
    "qualification",
    "specialties",
    "contactNumber",
    "email",
];
const CENTER_SUMMARY: &[&str] = &["id", "name", "services", "location"];
const CENTER_DETAIL: &[&str] = &["id", "name", "services", "location", "contactNumber"];

pub struct BookingService {
    state: Arc<AppState>,
    lifecycle: BookingLifecycle,
}

impl BookingService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            lifecycle: BookingLifecycle::new(),
        }
    }

    /// Create a booking for the requesting user. Referential checks and the
    /// insert are separate single-document operations; there is no
    /// transaction around them.
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        request: CreateBookingRequest,
    ) -> Result<BookingView, AppError> {
        let (Some(booking_for_raw), Some(appointment_date)) =
            (request.booking_for.as_deref(), request.appointment_date)
        else {
            return Err(AppError::Validation(
                "Booking type and appointment date are required".to_string(),
            ));
        };
        let booking_for = BookingFor::parse(booking_for_raw).ok_or_else(|| {
            AppError::Validation(format!(
                "{} is not a valid value for bookingFor",
                booking_for_raw
            ))
        })?;

        let (doctor_id, healthcare_id) = match booking_for {
            BookingFor::Doctor => {
                let raw = request.doctor.as_deref().ok_or_else(|| {
                    AppError::Validation("Doctor is required for doctor booking".to_string())
                })?;
                (Some(parse_object_id("doctor", raw)?), None)
            }
            BookingFor::HealthcareCenter => {
                let raw = request.healthcare_center.as_deref().ok_or_else(|| {
                    AppError::Validation(
                        "Healthcare center is required for healthcare booking".to_string(),
                    )
                })?;
                (None, Some(parse_object_id("healthcareCenter", raw)?))
            }
        };

        self.state
            .store
            .get(collections::USERS, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(id) = doctor_id {
            let doctor = self
                .state
                .store
                .get(collections::DOCTORS, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;
            if doctor["isActive"] != json!(true) {
                return Err(AppError::Validation("Doctor is not active".to_string()));
            }
        }
        if let Some(id) = healthcare_id {
            let center = self
                .state
                .store
                .get(collections::HEALTHCARE_CENTERS, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Healthcare center not found".to_string()))?;
            if center["isActive"] != json!(true) {
                return Err(AppError::Validation(
                    "Healthcare center is not active".to_string(),
                ));
            }
        }

        if appointment_date <= Utc::now() {
            return Err(AppError::Validation(
                "Appointment date must be in the future".to_string(),
            ));
        }

        let doc = self
            .state
            .store
            .insert(
                collections::BOOKINGS,
                json!({
                    "user": user_id,
                    "doctor": doctor_id,
                    "healthcareCenter": healthcare_id,
                    "bookingFor": booking_for,
                    "appointmentDate": appointment_date,
                    "reason": request.reason,
                    "status": BookingStatus::Pending,
                }),
            )
            .await?;

        let booking = decode(doc)?;
        info!("Created booking {} for user {}", booking.id, user_id);
        self.populate(booking, false).await
    }

    pub async fn list_bookings(
        &self,
        status: Option<&str>,
        booking_for: Option<&str>,
    ) -> Result<Vec<BookingView>, AppError> {
        let mut query = Query::new().sort_desc("createdAt");
        if let Some(status) = status {
            query = query.eq("status", json!(status));
        }
        if let Some(booking_for) = booking_for {
            query = query.eq("bookingFor", json!(booking_for));
        }

        let docs = self.state.store.find(collections::BOOKINGS, &query).await?;
        self.populate_all(docs).await
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<BookingView, AppError> {
        let doc = self
            .state
            .store
            .get(collections::BOOKINGS, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        self.populate(decode(doc)?, true).await
    }

    /// Admin status overwrite. Only the terminal-state guard applies: any
    /// non-terminal booking accepts any of the four statuses.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: Option<&str>,
    ) -> Result<BookingView, AppError> {
        let new_status = status
            .and_then(BookingStatus::parse)
            .ok_or_else(|| AppError::Validation("Valid status is required".to_string()))?;

        let booking = self.load(id).await?;
        self.lifecycle
            .validate_transition(&booking.status, &new_status)?;

        let doc = self
            .state
            .store
            .update(collections::BOOKINGS, id, json!({ "status": new_status }))
            .await?;
        debug!("Booking {} moved {:?} -> {:?}", id, booking.status, new_status);
        self.populate(decode(doc)?, false).await
    }

    pub async fn cancel_booking(&self, id: Uuid) -> Result<BookingView, AppError> {
        let booking = self.load(id).await?;
        self.lifecycle
            .validate_transition(&booking.status, &BookingStatus::Cancelled)?;

        let doc = self
            .state
            .store
            .update(
                collections::BOOKINGS,
                id,
                json!({ "status": BookingStatus::Cancelled }),
            )
            .await?;
        info!("Booking {} cancelled", id);
        self.populate(decode(doc)?, false).await
    }

    pub async fn doctor_appointments(
        &self,
        doctor_id: Uuid,
        date: Option<NaiveDate>,
        status: Option<&str>,
    ) -> Result<Vec<BookingView>, AppError> {
        self.target_appointments(BookingFor::Doctor, "doctor", doctor_id, date, status)
            .await
    }

    pub async fn healthcare_appointments(
        &self,
        healthcare_id: Uuid,
        date: Option<NaiveDate>,
        status: Option<&str>,
    ) -> Result<Vec<BookingView>, AppError> {
        self.target_appointments(
            BookingFor::HealthcareCenter,
            "healthcareCenter",
            healthcare_id,
            date,
            status,
        )
        .await
    }

    async fn target_appointments(
        &self,
        booking_for: BookingFor,
        field: &str,
        target_id: Uuid,
        date: Option<NaiveDate>,
        status: Option<&str>,
    ) -> Result<Vec<BookingView>, AppError> {
        let mut query = Query::new()
            .eq(field, json!(target_id))
            .eq("bookingFor", json!(booking_for))
            .sort_asc("appointmentDate");
        if let Some(status) = status {
            query = query.eq("status", json!(status));
        }
        if let Some(date) = date {
            let (from, to) = utc_day_window(date);
            query = query.between("appointmentDate", from, to);
        }

        let docs = self.state.store.find(collections::BOOKINGS, &query).await?;
        self.populate_all(docs).await
    }

    /// Aggregate count by status plus bookings falling on the current
    /// local calendar day.
    pub async fn stats(&self) -> Result<BookingStats, AppError> {
        let docs = self
            .state
            .store
            .find(collections::BOOKINGS, &Query::new())
            .await?;

        let (day_start, day_end) = local_today_window();
        let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
        let mut today = 0u64;

        for doc in &docs {
            let booking = decode(doc.clone())?;
            *by_status
                .entry(booking.status.as_str().to_string())
                .or_insert(0) += 1;
            if booking.appointment_date >= day_start && booking.appointment_date < day_end {
                today += 1;
            }
        }

        Ok(BookingStats {
            total: docs.len() as u64,
            today,
            by_status,
        })
    }

    async fn load(&self, id: Uuid) -> Result<Booking, AppError> {
        let doc = self
            .state
            .store
            .get(collections::BOOKINGS, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        decode(doc)
    }

    async fn populate_all(&self, docs: Vec<Value>) -> Result<Vec<BookingView>, AppError> {
        let mut views = Vec::with_capacity(docs.len());
        for doc in docs {
            views.push(self.populate(decode(doc)?, false).await?);
        }
        Ok(views)
    }

    async fn populate(&self, booking: Booking, detail: bool) -> Result<BookingView, AppError> {
        let user_fields = if detail { USER_DETAIL } else { USER_SUMMARY };
        let doctor_fields = if detail { DOCTOR_DETAIL } else { DOCTOR_SUMMARY };
        let center_fields = if detail { CENTER_DETAIL } else { CENTER_SUMMARY };

        let user = self
            .state
            .store
            .get(collections::USERS, booking.user)
            .await?
            .map(|doc| project(&doc, user_fields));

        let doctor = match booking.doctor {
            Some(id) => self
                .state
                .store
                .get(collections::DOCTORS, id)
                .await?
                .map(|doc| project(&doc, doctor_fields)),
            None => None,
        };

        let healthcare_center = match booking.healthcare_center {
            Some(id) => self
                .state
                .store
                .get(collections::HEALTHCARE_CENTERS, id)
                .await?
                .map(|doc| project(&doc, center_fields)),
            None => None,
        };

        Ok(BookingView {
            id: booking.id,
            user,
            doctor,
            healthcare_center,
            booking_for: booking.booking_for,
            appointment_date: booking.appointment_date,
            reason: booking.reason,
            status: booking.status,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        })
    }
}

fn decode(doc: Value) -> Result<Booking, AppError> {
    serde_json::from_value(doc)
        .map_err(|e| AppError::Internal(format!("Corrupt booking record: {}", e)))
}

fn project(doc: &Value, fields: &[&str]) -> Value {
    let mut map = Map::new();
    if let Value::Object(source) = doc {
        for field in fields {
            if let Some(value) = source.get(*field) {
                if !value.is_null() {
                    map.insert((*field).to_string(), value.clone());
                }
            }
        }
    }
    Value::Object(map)
}

/// `[00:00, 24:00)` of the given date, in UTC.
fn utc_day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default());
    (start, start + Duration::days(1))
}

/// `[00:00, 24:00)` of the server's current local day, converted to UTC.
fn local_today_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = Local::now().date_naive().and_hms_opt(0, 0, 0).unwrap_or_default();
    let start = match midnight.and_local_timezone(Local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Midnight skipped by a DST jump: fall back to the UTC reading.
        LocalResult::None => Utc.from_utc_datetime(&midnight),
    };
    (start, start + Duration::days(1))
}
