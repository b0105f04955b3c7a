//! Database models
//!
//! Data structures representing database tables

use serde::{Deserialize, Serialize};

/// User credential record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String, // 'USER' or 'ADMIN'
    pub created_at: String,
}

/// Station record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub code: String,
    pub name: String,
    pub city: String,
}

/// Train record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Train {
    pub id: String,
    pub train_no: String,
    pub name: String,
    pub source: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    /// Comma-separated day abbreviations, e.g. "Mon,Wed,Fri"
    pub days_of_operation: String,
    #[serde(default)]
    pub classes: Vec<TrainClass>,
}

impl Train {
    /// Day abbreviations this train runs on
    pub fn operating_days(&self) -> Vec<&str> {
        self.days_of_operation
            .split(',')
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .collect()
    }

    pub fn runs_on(&self, day: &str) -> bool {
        self.operating_days().iter().any(|d| d.eq_ignore_ascii_case(day))
    }
}

/// Seat class record attached to a train
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainClass {
    pub code: String,
    pub name: String,
    pub fare: i64,
    pub available_seats: i64,
}

/// Booking record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub pnr: String,
    pub train_id: String,
    pub train_no: String,
    pub train_name: String,
    pub source: String,
    pub destination: String,
    pub date: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub class_code: String,
    pub total_fare: i64,
    pub status: String, // 'CONFIRMED', 'WAITING', 'CANCELLED'
    pub booked_at: String,
    #[serde(default)]
    pub passengers: Vec<PassengerRecord>,
}

/// Passenger row belonging to a booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerRecord {
    pub id: String,
    pub booking_id: String,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub berth_preference: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_operating_days() {
        let train = Train {
            id: "1".into(),
            train_no: "12301".into(),
            name: "Rajdhani Express".into(),
            source: "NDLS".into(),
            destination: "HWH".into(),
            departure_time: "16:55".into(),
            arrival_time: "10:00".into(),
            duration: "17h 05m".into(),
            days_of_operation: "Mon, Wed,Fri".into(),
            classes: vec![],
        };

        assert_eq!(train.operating_days(), vec!["Mon", "Wed", "Fri"]);
        assert!(train.runs_on("wed"));
        assert!(!train.runs_on("Sun"));
    }
}
