//! API request/response models

pub mod bookings;
pub mod trains;

pub use bookings::*;
pub use trains::*;
