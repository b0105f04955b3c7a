//! Database module
//!
//! This module provides database management functionality including:
//! - Database connection pool management
//! - Repository pattern implementations
//! - Database migrations
//! - Demo data seeding
//! - Data models and schemas

pub mod manager;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod seed;

pub use manager::DatabaseManager;
pub use models::{Booking, PassengerRecord, Station, Train, TrainClass, User};
pub use repository::{
    BookingRepository, Repository, StationRepository, TrainRepository, UserRepository,
};
