//! Train catalog API handlers

use crate::api::models::{ActionResponse, CreateTrainRequest, SearchTrainsQuery};
use crate::auth::middleware::AuthUser;
use crate::core::error::{RailError, Result};
use crate::db::models::{Train, TrainClass};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::AppState;

/// Handler for GET /api/trains - List the whole catalog
pub async fn list_trains(State(state): State<AppState>) -> Result<Json<Vec<Train>>> {
    let trains = state.train_repo.find_all().await?;
    Ok(Json(trains))
}

/// Handler for GET /api/trains/search - Search trains on a route
pub async fn search_trains(
    State(state): State<AppState>,
    Query(query): Query<SearchTrainsQuery>,
) -> Result<Json<Vec<Train>>> {
    let source = query.source.unwrap_or_default();
    let destination = query.destination.unwrap_or_default();

    let trains = state
        .catalog_service
        .search(&source, &destination, query.date.as_deref())
        .await?;

    Ok(Json(trains))
}

/// Handler for POST /api/admin/trains - Create a train (admin only)
pub async fn create_train(
    State(state): State<AppState>,
    admin: AuthUser,
    Json(req): Json<CreateTrainRequest>,
) -> Result<impl IntoResponse> {
    admin.require_admin()?;

    if req.train_no.trim().is_empty() || req.name.trim().is_empty() {
        return Err(RailError::ValidationError(
            "train_no and name are required".to_string(),
        ));
    }
    if req.source.trim().is_empty() || req.destination.trim().is_empty() {
        return Err(RailError::ValidationError(
            "source and destination are required".to_string(),
        ));
    }
    if req.classes.is_empty() {
        return Err(RailError::ValidationError(
            "A train needs at least one seat class".to_string(),
        ));
    }
    if req.days_of_operation.is_empty() {
        return Err(RailError::ValidationError(
            "A train needs at least one day of operation".to_string(),
        ));
    }

    let train = Train {
        id: Uuid::new_v4().to_string(),
        train_no: req.train_no,
        name: req.name,
        source: req.source,
        destination: req.destination,
        departure_time: req.departure_time,
        arrival_time: req.arrival_time,
        duration: req.duration,
        days_of_operation: req.days_of_operation.join(","),
        classes: req
            .classes
            .into_iter()
            .map(|c| TrainClass {
                code: c.code,
                name: c.name,
                fare: c.fare,
                available_seats: c.available_seats,
            })
            .collect(),
    };

    state.train_repo.create(&train).await?;

    tracing::info!(train_no = %train.train_no, "Train created");

    Ok((StatusCode::CREATED, Json(train)))
}

/// Handler for DELETE /api/admin/trains/:id - Remove a train (admin only)
pub async fn delete_train(
    State(state): State<AppState>,
    Path(id): Path<String>,
    admin: AuthUser,
) -> Result<Json<ActionResponse>> {
    admin.require_admin()?;

    let deleted = state.train_repo.delete(&id).await?;
    if !deleted {
        return Err(RailError::NotFound(format!("Train {} not found", id)));
    }

    tracing::info!(train_id = %id, "Train deleted");

    Ok(Json(ActionResponse {
        message: "Train deleted".to_string(),
    }))
}
