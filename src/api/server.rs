//! HTTP Server implementation
//!
//! This module provides the HTTP server using Axum framework with:
//! - Configurable host/port binding
//! - Graceful shutdown handling
//! - Health check endpoint
//! - CORS support

use crate::api::handlers::AppState;
use crate::api::routes::{protected_routes, public_routes};
use crate::core::config::{Config, ServerConfig};
use crate::core::services::{BookingService, CatalogService};
use crate::db::manager::DatabaseManager;
use crate::db::repository::{
    BookingRepository, StationRepository, TrainRepository, UserRepository,
};
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// HTTP API Server
pub struct ApiServer {
    router: Router,
    config: ServerConfig,
}

impl ApiServer {
    /// Create a new API server with the given configuration and database manager
    pub fn new(config: Config, db: Arc<DatabaseManager>) -> anyhow::Result<Self> {
        let server_config = config.server.clone();
        let router = Self::build_router(&config, db);

        Ok(Self {
            router,
            config: server_config,
        })
    }

    /// Build the Axum router with all routes and middleware
    fn build_router(config: &Config, db: Arc<DatabaseManager>) -> Router {
        let user_repo = Arc::new(UserRepository::new(db.clone()));
        let station_repo = Arc::new(StationRepository::new(db.clone()));
        let train_repo = Arc::new(TrainRepository::new(db.clone()));
        let booking_repo = Arc::new(BookingRepository::new(db));

        let catalog_service = Arc::new(CatalogService::new(train_repo.clone()));
        let booking_service = Arc::new(BookingService::new(
            booking_repo.clone(),
            train_repo.clone(),
            Duration::from_millis(config.payment.settlement_delay_ms),
        ));

        let app_state = AppState {
            user_repo,
            station_repo,
            train_repo,
            booking_repo,
            catalog_service,
            booking_service,
            jwt_secret: Arc::new(config.security.jwt_secret.clone()),
            token_ttl_days: config.security.token_ttl_days,
        };

        Router::new()
            .route("/api/health", get(health_check))
            .merge(public_routes())
            .merge(protected_routes(app_state.clone()))
            .with_state(app_state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(Self::build_cors_layer(&config.security.allowed_origins)),
            )
    }

    /// Build CORS layer from allowed origins configuration
    fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
        use tower_http::cors::Any;

        let cors = CorsLayer::new();

        if allowed_origins.contains(&"*".to_string()) {
            cors.allow_origin(Any).allow_methods(Any).allow_headers(Any)
        } else {
            let origins: Vec<_> = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            cors.allow_origin(origins).allow_methods(Any).allow_headers(Any)
        }
    }

    /// Start the HTTP server and listen for requests
    ///
    /// This method will block until the server is shut down gracefully.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr.parse()?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;

        info!(addr = %socket_addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");

        Ok(())
    }

    /// Get a reference to the router
    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::{seed_catalog, seed_demo_accounts};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let mut config = Config::defaults().unwrap();
        config.security.jwt_secret = "test-secret".to_string();
        config.payment.settlement_delay_ms = 0;

        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        let stations = StationRepository::new(db.clone());
        let trains = Arc::new(TrainRepository::new(db.clone()));
        let users = UserRepository::new(db.clone());
        seed_catalog(&stations, &trains).await.unwrap();
        seed_demo_accounts(&users).await.unwrap();

        ApiServer::build_router(&config, db)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json");

        match body {
            Some(b) => builder.body(Body::from(b.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(router: &Router, email: &str, password: &str) -> String {
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/login",
                json!({"email": email, "password": password}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = test_router().await;
        let response = router
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_login_profile_round_trip() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/register",
                json!({"name": "A", "email": "a@x.com", "password": "p1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/login",
                json!({"email": "a@x.com", "password": "p1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        // Role defaults to USER and the hash never leaves the server
        assert_eq!(body["user"]["role"], "USER");
        assert_eq!(body["user"]["email"], "a@x.com");
        assert!(body["user"].get("password_hash").is_none());
        let token = body["token"].as_str().unwrap().to_string();
        let user_id = body["user"]["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(authed_request("GET", "/api/profile", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let profile = body_json(response).await;
        assert_eq!(profile["id"], user_id.as_str());
        assert_eq!(profile["email"], "a@x.com");
        assert_eq!(profile["role"], "USER");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let router = test_router().await;

        let req = json!({"name": "A", "email": "dup@x.com", "password": "p1"});
        let first = router
            .clone()
            .oneshot(json_request("POST", "/api/register", req.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .clone()
            .oneshot(json_request("POST", "/api/register", req))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let body = body_json(second).await;
        assert!(body["message"].as_str().unwrap().contains("Email already exists"));

        // First registration is unaffected
        login(&router, "dup@x.com", "p1").await;
    }

    #[tokio::test]
    async fn test_login_failures_share_one_shape() {
        let router = test_router().await;

        router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/register",
                json!({"name": "A", "email": "a@x.com", "password": "p1"}),
            ))
            .await
            .unwrap();

        let wrong_password = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/login",
                json!({"email": "a@x.com", "password": "nope"}),
            ))
            .await
            .unwrap();
        let unknown_email = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/login",
                json!({"email": "ghost@x.com", "password": "p1"}),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

        let a = body_json(wrong_password).await;
        let b = body_json(unknown_email).await;
        assert_eq!(a["message"], b["message"]);
        assert_eq!(a["error"], b["error"]);
    }

    #[tokio::test]
    async fn test_profile_rejects_bad_tokens() {
        let router = test_router().await;

        let missing = router
            .clone()
            .oneshot(Request::get("/api/profile").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let garbage = router
            .clone()
            .oneshot(authed_request("GET", "/api/profile", "not-a-jwt", None))
            .await
            .unwrap();
        assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

        // Signed with a different secret
        let forged =
            crate::auth::jwt::generate_token("u1", "USER", "other-secret", 1).unwrap();
        let response = router
            .clone()
            .oneshot(authed_request("GET", "/api/profile", &forged, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_train_search() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(
                Request::get("/api/trains/search?source=NDLS&destination=HWH")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let trains = body_json(response).await;
        assert_eq!(trains.as_array().unwrap().len(), 1);
        assert_eq!(trains[0]["name"], "Rajdhani Express");

        let missing_criteria = router
            .clone()
            .oneshot(
                Request::get("/api/trains/search?source=NDLS")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing_criteria.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_booking_flow_over_http() {
        let router = test_router().await;
        let token = login(&router, "user@irctc.com", "user123").await;

        let order = json!({
            "train_id": "1",
            "class_code": "3A",
            "date": "2026-09-01",
            "passengers": [
                {"name": "A", "age": 30, "gender": "Male", "berth_preference": "Lower"},
                {"name": "B", "age": 28, "gender": "Female", "berth_preference": "No Preference"}
            ]
        });

        let response = router
            .clone()
            .oneshot(authed_request("POST", "/api/bookings", &token, Some(order)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let booking = body_json(response).await;
        assert_eq!(booking["status"], "CONFIRMED");
        assert_eq!(booking["total_fare"], 3900);
        assert_eq!(booking["pnr"].as_str().unwrap().len(), 10);
        let booking_id = booking["id"].as_str().unwrap().to_string();

        // History
        let response = router
            .clone()
            .oneshot(authed_request("GET", "/api/bookings", &token, None))
            .await
            .unwrap();
        let history = body_json(response).await;
        assert_eq!(history.as_array().unwrap().len(), 1);

        // Cancel twice; the second is a no-op
        for _ in 0..2 {
            let response = router
                .clone()
                .oneshot(authed_request(
                    "POST",
                    &format!("/api/bookings/{}/cancel", booking_id),
                    &token,
                    None,
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let cancelled = body_json(response).await;
            assert_eq!(cancelled["status"], "CANCELLED");
            assert_eq!(cancelled["total_fare"], 3900);
        }

        // Another user's history does not show it
        let admin_token = login(&router, "admin@irctc.com", "admin123").await;
        let response = router
            .clone()
            .oneshot(authed_request("GET", "/api/bookings", &admin_token, None))
            .await
            .unwrap();
        let other_history = body_json(response).await;
        assert!(other_history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let router = test_router().await;
        let user_token = login(&router, "user@irctc.com", "user123").await;
        let admin_token = login(&router, "admin@irctc.com", "admin123").await;

        let station = json!({"code": "CDG", "name": "Chandigarh", "city": "Chandigarh"});

        let forbidden = router
            .clone()
            .oneshot(authed_request(
                "POST",
                "/api/admin/stations",
                &user_token,
                Some(station.clone()),
            ))
            .await
            .unwrap();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let created = router
            .clone()
            .oneshot(authed_request(
                "POST",
                "/api/admin/stations",
                &admin_token,
                Some(station),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let deleted = router
            .clone()
            .oneshot(authed_request(
                "DELETE",
                "/api/admin/stations/CDG",
                &admin_token,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::OK);

        let missing = router
            .clone()
            .oneshot(authed_request(
                "DELETE",
                "/api/admin/stations/CDG",
                &admin_token,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
