//! Booking API handlers

use crate::api::models::CreateBookingRequest;
use crate::auth::middleware::AuthUser;
use crate::booking::workflow::SettlementOrder;
use crate::core::error::{RailError, Result};
use crate::db::models::Booking;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::AppState;

/// Handler for GET /api/bookings - Current user's booking history, newest first
pub async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Booking>>> {
    let bookings = state.booking_repo.find_by_user(&user.id).await?;
    Ok(Json(bookings))
}

/// Handler for GET /api/bookings/:id - One booking, scoped to its owner
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<Json<Booking>> {
    let booking = state
        .booking_repo
        .find_by_id(&id)
        .await?
        .filter(|b| b.user_id == user.id)
        .ok_or_else(|| RailError::NotFound(format!("Booking {} not found", id)))?;

    Ok(Json(booking))
}

/// Handler for POST /api/bookings - Settle a booking order
///
/// Runs the simulated payment settlement and persists exactly one booking.
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse> {
    let order = SettlementOrder {
        train_id: req.train_id,
        class_code: req.class_code,
        date: req.date,
        passengers: req.passengers,
    };

    let booking = state.booking_service.settle(&user.id, &order).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for POST /api/bookings/:id/cancel - Cancel a booking
///
/// Idempotent; repeated cancellation leaves the record unchanged.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<Json<Booking>> {
    let booking = state.booking_service.cancel(&user.id, &id).await?;
    Ok(Json(booking))
}
