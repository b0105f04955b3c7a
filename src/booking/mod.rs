//! Booking domain module
//!
//! This module provides the booking workflow including:
//! - Passenger and seat-class domain types
//! - The passengers -> payment -> confirmation workflow state machine
//! - PNR generation

pub mod pnr;
pub mod workflow;

pub use pnr::{generate_pnr, PNR_LENGTH};
pub use workflow::{
    BookingSelection, BookingWorkflow, BerthPreference, Gender, Passenger, PassengerDraft,
    PassengerUpdate, SettlementOrder, TrainSummary, WorkflowError, WorkflowStep,
};
