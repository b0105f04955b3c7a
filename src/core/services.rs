//! Business logic services
//!
//! This module implements the Application Layer services that coordinate between
//! the REST API Layer and the Infrastructure Layer (database).

use crate::booking::workflow::{SettlementOrder, MAX_PASSENGERS};
use crate::booking::pnr::generate_pnr;
use crate::core::error::{RailError, Result};
use crate::db::models::{Booking, PassengerRecord, Train};
use crate::db::repository::{BookingRepository, TrainRepository};
use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Bounded retries when a generated PNR collides with an existing booking
const PNR_MAX_ATTEMPTS: usize = 5;

/// Catalog service for train search
pub struct CatalogService {
    train_repo: Arc<TrainRepository>,
}

impl CatalogService {
    pub fn new(train_repo: Arc<TrainRepository>) -> Self {
        Self { train_repo }
    }

    /// Search trains on a route, optionally keeping only trains that run
    /// on the travel date's weekday
    pub async fn search(
        &self,
        source: &str,
        destination: &str,
        date: Option<&str>,
    ) -> Result<Vec<Train>> {
        if source.trim().is_empty() || destination.trim().is_empty() {
            return Err(RailError::InvalidRequest(
                "source and destination are required".to_string(),
            ));
        }

        let mut trains = self.train_repo.find_by_route(source, destination).await?;

        if let Some(date) = date {
            let day = weekday_abbrev(date)?;
            trains.retain(|t| t.runs_on(day));
        }

        Ok(trains)
    }
}

/// Map a YYYY-MM-DD date to its "Mon".."Sun" abbreviation
fn weekday_abbrev(date: &str) -> Result<&'static str> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| RailError::InvalidRequest(format!("Invalid date '{}': {}", date, e)))?;

    Ok(match parsed.weekday() {
        chrono::Weekday::Mon => "Mon",
        chrono::Weekday::Tue => "Tue",
        chrono::Weekday::Wed => "Wed",
        chrono::Weekday::Thu => "Thu",
        chrono::Weekday::Fri => "Fri",
        chrono::Weekday::Sat => "Sat",
        chrono::Weekday::Sun => "Sun",
    })
}

/// Booking service owning settlement and cancellation
pub struct BookingService {
    booking_repo: Arc<BookingRepository>,
    train_repo: Arc<TrainRepository>,
    settlement_delay: Duration,
}

impl BookingService {
    pub fn new(
        booking_repo: Arc<BookingRepository>,
        train_repo: Arc<TrainRepository>,
        settlement_delay: Duration,
    ) -> Self {
        Self {
            booking_repo,
            train_repo,
            settlement_delay,
        }
    }

    /// Settle a booking order for a user
    ///
    /// Validates the order against the catalog, simulates payment settlement
    /// with the configured delay, then persists exactly one booking with a
    /// fresh PNR, status CONFIRMED and total_fare = fare * passenger count.
    /// Settlement always resolves; there is no cancellation mid-flight.
    pub async fn settle(&self, user_id: &str, order: &SettlementOrder) -> Result<Booking> {
        if order.passengers.is_empty() || order.passengers.len() > MAX_PASSENGERS {
            return Err(RailError::ValidationError(format!(
                "A booking takes 1 to {} passengers",
                MAX_PASSENGERS
            )));
        }

        if order.passengers.iter().any(|p| p.name.trim().is_empty() || p.age == 0) {
            return Err(RailError::ValidationError(
                "Every passenger needs a name and a valid age".to_string(),
            ));
        }

        let train = self
            .train_repo
            .find_by_id(&order.train_id)
            .await?
            .ok_or_else(|| RailError::NotFound(format!("Train {} not found", order.train_id)))?;

        // The catalog fare is authoritative, never the client's copy
        let class = train
            .classes
            .iter()
            .find(|c| c.code == order.class_code)
            .ok_or_else(|| {
                RailError::NotFound(format!(
                    "Class {} not offered on train {}",
                    order.class_code, train.train_no
                ))
            })?;

        tracing::info!(
            user_id,
            train_no = %train.train_no,
            class = %class.code,
            passengers = order.passengers.len(),
            "Settling payment"
        );

        // Simulated settlement window
        tokio::time::sleep(self.settlement_delay).await;

        let pnr = self.fresh_pnr().await?;
        let booking_id = Uuid::new_v4().to_string();
        let total_fare = class.fare * order.passengers.len() as i64;

        let booking = Booking {
            id: booking_id.clone(),
            user_id: user_id.to_string(),
            pnr,
            train_id: train.id.clone(),
            train_no: train.train_no.clone(),
            train_name: train.name.clone(),
            source: train.source.clone(),
            destination: train.destination.clone(),
            date: order.date.clone(),
            departure_time: train.departure_time.clone(),
            arrival_time: train.arrival_time.clone(),
            class_code: class.code.clone(),
            total_fare,
            status: "CONFIRMED".to_string(),
            booked_at: Utc::now().to_rfc3339(),
            passengers: order
                .passengers
                .iter()
                .map(|p| PassengerRecord {
                    id: Uuid::new_v4().to_string(),
                    booking_id: booking_id.clone(),
                    name: p.name.clone(),
                    age: p.age as i64,
                    gender: serde_json::to_value(p.gender)
                        .ok()
                        .and_then(|v| v.as_str().map(String::from))
                        .unwrap_or_default(),
                    berth_preference: serde_json::to_value(p.berth_preference)
                        .ok()
                        .and_then(|v| v.as_str().map(String::from))
                        .unwrap_or_default(),
                })
                .collect(),
        };

        self.booking_repo.create(&booking).await?;

        tracing::info!(pnr = %booking.pnr, total_fare, "Booking confirmed");

        Ok(booking)
    }

    /// Generate a PNR that does not collide with any persisted booking
    async fn fresh_pnr(&self) -> Result<String> {
        for _ in 0..PNR_MAX_ATTEMPTS {
            let candidate = {
                let mut rng = rand::thread_rng();
                generate_pnr(&mut rng)
            };
            if !self.booking_repo.pnr_exists(&candidate).await? {
                return Ok(candidate);
            }
            tracing::warn!(pnr = %candidate, "PNR collision, regenerating");
        }

        Err(RailError::TaskError(
            "Could not allocate a unique PNR".to_string(),
        ))
    }

    /// Cancel a booking in place
    ///
    /// CONFIRMED and WAITING bookings flip to CANCELLED; cancelling an
    /// already cancelled booking is a no-op. Fare is never recomputed and
    /// no seat counters are adjusted.
    pub async fn cancel(&self, user_id: &str, booking_id: &str) -> Result<Booking> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| RailError::NotFound(format!("Booking {} not found", booking_id)))?;

        if booking.status != "CANCELLED" {
            self.booking_repo.update_status(booking_id, "CANCELLED").await?;
            tracing::info!(pnr = %booking.pnr, "Booking cancelled");
        }

        self.booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| RailError::NotFound(format!("Booking {} not found", booking_id)))
    }
}
