//! Catalog request/response models

use serde::{Deserialize, Serialize};

/// Query parameters for GET /api/trains/search
#[derive(Debug, Deserialize)]
pub struct SearchTrainsQuery {
    pub source: Option<String>,
    pub destination: Option<String>,
    /// Travel date (YYYY-MM-DD); filters by day of operation when present
    pub date: Option<String>,
}

/// Admin request to create a train with its seat classes
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTrainRequest {
    pub train_no: String,
    pub name: String,
    pub source: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub days_of_operation: Vec<String>,
    pub classes: Vec<TrainClassInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainClassInput {
    pub code: String,
    pub name: String,
    pub fare: i64,
    #[serde(default)]
    pub available_seats: i64,
}

/// Admin request to create a station
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateStationRequest {
    pub code: String,
    pub name: String,
    pub city: String,
}

/// Generic action acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub message: String,
}
