//! Booking request/response models

use crate::booking::workflow::Passenger;
use serde::{Deserialize, Serialize};

/// Request body for POST /api/bookings
///
/// This is the settlement order the workflow hands out at the payment step.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub train_id: String,
    pub class_code: String,
    /// Travel date (YYYY-MM-DD)
    pub date: String,
    pub passengers: Vec<Passenger>,
}
