use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Discriminates which of the two target references a booking carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingFor {
    Doctor,
    HealthcareCenter,
}

impl BookingFor {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Doctor" => Some(BookingFor::Doctor),
            "HealthcareCenter" => Some(BookingFor::HealthcareCenter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingFor::Doctor => "Doctor",
            BookingFor::HealthcareCenter => "HealthcareCenter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Pending" => Some(BookingStatus::Pending),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Completed" => Some(BookingStatus::Completed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Booking as persisted. Exactly one of `doctor`/`healthcare_center` is
/// set, matching `booking_for`; the user reference is immutable after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user: Uuid,
    #[serde(default)]
    pub doctor: Option<Uuid>,
    #[serde(default)]
    pub healthcare_center: Option<Uuid>,
    pub booking_for: BookingFor,
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub doctor: Option<String>,
    #[serde(default)]
    pub healthcare_center: Option<String>,
    #[serde(default)]
    pub booking_for: Option<String>,
    #[serde(default)]
    pub appointment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Booking with its references replaced by minimal projections of the
/// referenced documents, ready for the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    pub user: Option<Value>,
    pub doctor: Option<Value>,
    pub healthcare_center: Option<Value>,
    pub booking_for: BookingFor,
    pub appointment_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total: u64,
    pub today: u64,
    pub by_status: BTreeMap<String, u64>,
}
