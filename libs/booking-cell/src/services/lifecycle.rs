use tracing::{debug, warn};

use shared_models::error::AppError;

use crate::models::BookingStatus;

/// Status state machine for bookings. `Completed` and `Cancelled` are
/// terminal; every non-terminal state may move to any of the four
/// statuses, including skipping `Confirmed` entirely.
pub struct BookingLifecycle;

impl BookingLifecycle {
    pub fn new() -> Self {
        Self
    }

    pub fn valid_transitions(&self, current: &BookingStatus) -> Vec<BookingStatus> {
        if current.is_terminal() {
            return vec![];
        }
        vec![
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ]
    }

    pub fn validate_transition(
        &self,
        current: &BookingStatus,
        new_status: &BookingStatus,
    ) -> Result<(), AppError> {
        debug!("Validating status transition {:?} -> {:?}", current, new_status);

        if !self.valid_transitions(current).contains(new_status) {
            warn!("Rejected status transition out of terminal state {:?}", current);
            return Err(AppError::InvalidTransition(format!(
                "Booking is already {}",
                current
            )));
        }
        Ok(())
    }
}

impl Default for BookingLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
