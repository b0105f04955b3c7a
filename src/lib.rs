//! Railbook
//!
//! A train ticket booking system: user accounts with JWT sessions, a
//! station/train catalog with seat classes, multi-passenger bookings with
//! simulated payment settlement and PNR generation, plus a typed HTTP
//! client that drives the booking workflow.

pub mod api;
pub mod auth;
pub mod booking;
pub mod client;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::Config;
pub use client::ApiClient;
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = anyhow::Result<T>;
