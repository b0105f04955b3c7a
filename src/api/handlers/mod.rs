//! API handlers

pub mod bookings;
pub mod stations;
pub mod trains;

pub use bookings::*;
pub use stations::*;
pub use trains::*;

use crate::core::services::{BookingService, CatalogService};
use crate::db::repository::{
    BookingRepository, StationRepository, TrainRepository, UserRepository,
};
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repo: Arc<UserRepository>,
    pub station_repo: Arc<StationRepository>,
    pub train_repo: Arc<TrainRepository>,
    pub booking_repo: Arc<BookingRepository>,
    pub catalog_service: Arc<CatalogService>,
    pub booking_service: Arc<BookingService>,
    pub jwt_secret: Arc<String>,
    pub token_ttl_days: i64,
}
