//! Core application module
//!
//! This module provides the application layer including:
//! - Business logic services
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system

pub mod config;
pub mod error;
pub mod logging;
pub mod services;

pub use config::Config;
pub use error::{ErrorResponse, RailError, Result};
pub use logging::Logger;
pub use services::{BookingService, CatalogService};
