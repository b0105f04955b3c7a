//! API routes

use crate::api::handlers::{
    cancel_booking, create_booking, create_station, create_train, delete_station, delete_train,
    get_booking, list_bookings, list_stations, list_trains, search_trains, AppState,
};
use crate::auth::handlers::{get_profile, login, register};
use crate::auth::middleware::authenticate;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

/// Public routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/stations", get(list_stations))
        .route("/api/trains", get(list_trains))
        .route("/api/trains/search", get(search_trains))
}

/// Protected routes (authentication required)
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(get_profile))
        // Booking endpoints
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route("/api/bookings/:id", get(get_booking))
        .route("/api/bookings/:id/cancel", post(cancel_booking))
        // Catalog management endpoints (admin only)
        .route("/api/admin/stations", post(create_station))
        .route("/api/admin/stations/:code", delete(delete_station))
        .route("/api/admin/trains", post(create_train))
        .route("/api/admin/trains/:id", delete(delete_train))
        .layer(middleware::from_fn_with_state(state, authenticate))
}
