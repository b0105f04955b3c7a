//! Authentication API handlers

use crate::api::handlers::AppState;
use crate::auth::jwt::generate_token;
use crate::auth::middleware::AuthUser;
use crate::auth::models::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserInfo};
use crate::auth::password::{hash_password, verify_password};
use crate::core::error::{RailError, Result};
use crate::db::models::User;
use crate::db::repository::Repository;
use axum::{extract::State, response::IntoResponse, Json};
use uuid::Uuid;

/// Handler for POST /api/register - User registration
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!(email = %req.email, "User registration attempt");

    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(RailError::ValidationError(
            "name, email and password are required".to_string(),
        ));
    }

    let role = match req.role.as_deref() {
        None => "USER".to_string(),
        Some(r @ ("USER" | "ADMIN")) => r.to_string(),
        Some(other) => {
            return Err(RailError::ValidationError(format!(
                "Unknown role '{}'",
                other
            )))
        }
    };

    let password_hash = hash_password(&req.password)?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: req.name.clone(),
        email: req.email.clone(),
        password_hash,
        role: role.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    // The UNIQUE constraint on email serializes conflicting registrations;
    // only that violation maps to the duplicate-email message. Other store
    // failures keep their own classification.
    match state.user_repo.create(&user).await {
        Ok(_) => {
            tracing::info!(user_id = %user.id, email = %req.email, role = %role, "User registered successfully");
            Ok(Json(MessageResponse {
                message: "User registered successfully".to_string(),
            }))
        }
        Err(e) if e.is_unique_violation() => {
            tracing::warn!(email = %req.email, "Registration failed: duplicate email");
            Err(RailError::InvalidRequest("Email already exists".to_string()))
        }
        Err(e) => {
            tracing::error!(email = %req.email, error = %e, "Registration failed");
            Err(e)
        }
    }
}

/// Handler for POST /api/login - User login
///
/// An unknown email and a wrong password yield the same error shape, so
/// responses do not reveal which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    tracing::info!(email = %req.email, "Login attempt");

    let user = state
        .user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| RailError::AuthenticationError("Invalid credentials".to_string()))?;

    let is_valid = verify_password(&req.password, &user.password_hash)?;
    if !is_valid {
        tracing::warn!(email = %req.email, "Invalid password");
        return Err(RailError::AuthenticationError(
            "Invalid credentials".to_string(),
        ));
    }

    let token = generate_token(
        &user.id,
        &user.role,
        &state.jwt_secret,
        state.token_ttl_days,
    )?;

    tracing::info!(user_id = %user.id, "Login successful");

    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(user),
    }))
}

/// Handler for GET /api/profile - Current user's public projection
pub async fn get_profile(user: AuthUser) -> Result<Json<UserInfo>> {
    tracing::debug!(user_id = %user.id, "Profile lookup");

    Ok(Json(UserInfo {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    }))
}
