//! Station API handlers

use crate::api::models::{ActionResponse, CreateStationRequest};
use crate::auth::middleware::AuthUser;
use crate::core::error::{RailError, Result};
use crate::db::models::Station;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::AppState;

/// Handler for GET /api/stations - List all stations
pub async fn list_stations(State(state): State<AppState>) -> Result<Json<Vec<Station>>> {
    let stations = state.station_repo.find_all().await?;
    Ok(Json(stations))
}

/// Handler for POST /api/admin/stations - Create a station (admin only)
pub async fn create_station(
    State(state): State<AppState>,
    admin: AuthUser,
    Json(req): Json<CreateStationRequest>,
) -> Result<impl IntoResponse> {
    admin.require_admin()?;

    if req.code.trim().is_empty() || req.name.trim().is_empty() || req.city.trim().is_empty() {
        return Err(RailError::ValidationError(
            "code, name and city are required".to_string(),
        ));
    }

    // Codes are stored uppercase, so the duplicate check uses the same form
    let code = req.code.trim().to_uppercase();
    if state.station_repo.find_by_code(&code).await?.is_some() {
        return Err(RailError::ValidationError(format!(
            "Station '{}' already exists",
            code
        )));
    }

    let station = Station {
        code,
        name: req.name,
        city: req.city,
    };
    state.station_repo.create(&station).await?;

    tracing::info!(code = %station.code, "Station created");

    Ok((StatusCode::CREATED, Json(station)))
}

/// Handler for DELETE /api/admin/stations/:code - Remove a station (admin only)
pub async fn delete_station(
    State(state): State<AppState>,
    Path(code): Path<String>,
    admin: AuthUser,
) -> Result<Json<ActionResponse>> {
    admin.require_admin()?;

    let deleted = state.station_repo.delete(&code).await?;
    if !deleted {
        return Err(RailError::NotFound(format!("Station {} not found", code)));
    }

    tracing::info!(code = %code, "Station deleted");

    Ok(Json(ActionResponse {
        message: "Station deleted".to_string(),
    }))
}
