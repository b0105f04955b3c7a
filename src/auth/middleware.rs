//! Authentication middleware

use crate::auth::jwt::validate_token;
use crate::core::error::{RailError, Result};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Extension to store authenticated user info in request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    /// Admin gate for the management endpoints
    pub fn require_admin(&self) -> Result<()> {
        if self.role == "ADMIN" {
            Ok(())
        } else {
            Err(RailError::PermissionDenied(
                "Admin access required".to_string(),
            ))
        }
    }
}

/// Authentication middleware
///
/// Expects `Authorization: Bearer <token>`. Missing, malformed and expired
/// tokens all degrade to the same 401 response.
pub async fn authenticate(
    State(state): State<crate::api::handlers::AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = match token {
        Some(t) => t,
        None => {
            let error = RailError::AuthenticationError("Missing authentication token".to_string());
            return error.into_response();
        }
    };

    let claims = match validate_token(token, &state.jwt_secret) {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    // Fetch the user so a token for a deleted account does not authenticate
    use crate::db::repository::Repository;
    let user = match state.user_repo.find_by_id(&claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            let error = RailError::AuthenticationError("User not found".to_string());
            return error.into_response();
        }
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    });

    next.run(request).await
}

// Implement FromRequestParts for AuthUser to enable extraction in handlers
use axum::{extract::FromRequestParts, http::request::Parts};

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = RailError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| RailError::AuthenticationError("User not authenticated".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let admin = AuthUser {
            id: "1".into(),
            name: "A".into(),
            email: "a@x.com".into(),
            role: "ADMIN".into(),
        };
        assert!(admin.require_admin().is_ok());

        let user = AuthUser {
            role: "USER".into(),
            ..admin
        };
        assert!(matches!(
            user.require_admin(),
            Err(RailError::PermissionDenied(_))
        ));
    }
}
