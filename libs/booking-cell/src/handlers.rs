use std::sync::Arc;

use axum::extract::{Extension, Json, Path, Query, State};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use shared_database::AppState;
use shared_models::envelope::ApiResponse;
use shared_models::error::AppError;
use shared_models::principal::CurrentUser;
use shared_utils::extractor::parse_object_id;

use crate::models::{CreateBookingRequest, UpdateStatusRequest};
use crate::services::booking::BookingService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub booking_for: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentsQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format. Use YYYY-MM-DD".to_string()))
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<ApiResponse, AppError> {
    let booking = BookingService::new(state)
        .create_booking(user.id, request)
        .await?;
    Ok(ApiResponse::created(
        json!({ "booking": booking }),
        "Booking created successfully",
    ))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<ApiResponse, AppError> {
    let bookings = BookingService::new(state)
        .list_bookings(query.status.as_deref(), query.booking_for.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        json!({ "bookings": bookings }),
        "Bookings retrieved successfully",
    ))
}

pub async fn all_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<ApiResponse, AppError> {
    let bookings = BookingService::new(state)
        .list_bookings(query.status.as_deref(), None)
        .await?;
    Ok(ApiResponse::ok(
        json!({ "bookings": bookings }),
        "Bookings retrieved successfully",
    ))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = parse_object_id("id", &id)?;
    let booking = BookingService::new(state).get_booking(id).await?;
    Ok(ApiResponse::ok(
        json!({ "booking": booking }),
        "Booking retrieved successfully",
    ))
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<ApiResponse, AppError> {
    let id = parse_object_id("id", &id)?;
    let booking = BookingService::new(state)
        .update_status(id, request.status.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        json!({ "booking": booking }),
        "Booking status updated successfully",
    ))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = parse_object_id("id", &id)?;
    let booking = BookingService::new(state).cancel_booking(id).await?;
    Ok(ApiResponse::ok(
        json!({ "booking": booking }),
        "Booking cancelled successfully",
    ))
}

pub async fn doctor_appointments(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<AppointmentsQuery>,
) -> Result<ApiResponse, AppError> {
    let doctor_id = parse_object_id("doctorId", &doctor_id)?;
    let date = query.date.as_deref().map(parse_date).transpose()?;
    let appointments = BookingService::new(state)
        .doctor_appointments(doctor_id, date, query.status.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        json!({ "appointments": appointments }),
        "Doctor appointments retrieved successfully",
    ))
}

pub async fn healthcare_appointments(
    State(state): State<Arc<AppState>>,
    Path(healthcare_id): Path<String>,
    Query(query): Query<AppointmentsQuery>,
) -> Result<ApiResponse, AppError> {
    let healthcare_id = parse_object_id("healthcareId", &healthcare_id)?;
    let date = query.date.as_deref().map(parse_date).transpose()?;
    let appointments = BookingService::new(state)
        .healthcare_appointments(healthcare_id, date, query.status.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        json!({ "appointments": appointments }),
        "Healthcare center appointments retrieved successfully",
    ))
}

pub async fn booking_stats(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let stats = BookingService::new(state).stats().await?;
    Ok(ApiResponse::ok(
        json!({ "stats": stats }),
        "Booking statistics retrieved successfully",
    ))
}
