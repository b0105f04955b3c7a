//! Typed HTTP client
//!
//! Talks to the booking service over its JSON API and holds the session
//! lifecycle: explicit init (with token rehydration), login, teardown. The
//! booking screens drive the workflow state machine from `booking::workflow`
//! and hand its settlement order to [`ApiClient::submit_booking`].

pub mod session;
pub mod store;

pub use session::{Session, SessionContext};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use crate::auth::models::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use crate::booking::workflow::BookingWorkflow;
use crate::core::error::{ErrorResponse, RailError, Result};
use crate::db::models::{Booking, Station, Train};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Box<dyn SessionStore>,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Box<dyn SessionStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            session: SessionContext::default(),
        }
    }

    /// Initialize the session from the persisted token, if any
    ///
    /// The stored token is exchanged for a profile; any failure (network,
    /// rejection, malformed body) discards the token and leaves the client
    /// logged out. This is the only path that proactively checks token
    /// liveness.
    pub async fn init(&mut self) -> Result<()> {
        let Some(token) = self.store.load()? else {
            return Ok(());
        };

        let request = self
            .http
            .get(self.url("/api/profile"))
            .bearer_auth(&token);

        match Self::send(request).await {
            Ok(user) => {
                self.session.establish(token, user);
                Ok(())
            }
            Err(_) => {
                self.store.clear()?;
                self.session.teardown();
                Ok(())
            }
        }
    }

    /// Drop the in-memory session and the persisted token
    pub fn teardown(&mut self) -> Result<()> {
        self.session.teardown();
        self.store.clear()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let request = self.http.post(self.url("/api/register")).json(&RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
        });
        let _: serde_json::Value = Self::send(request).await?;
        Ok(())
    }

    /// Log in and persist the session token
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&UserInfo> {
        let request = self.http.post(self.url("/api/login")).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let response: LoginResponse = Self::send(request).await?;

        self.store.save(&response.token)?;
        self.session.establish(response.token, response.user);

        Ok(self.session.user().unwrap())
    }

    pub async fn profile(&self) -> Result<UserInfo> {
        Self::send(self.authed(self.http.get(self.url("/api/profile")))?).await
    }

    pub async fn stations(&self) -> Result<Vec<Station>> {
        Self::send(self.http.get(self.url("/api/stations"))).await
    }

    pub async fn trains(&self) -> Result<Vec<Train>> {
        Self::send(self.http.get(self.url("/api/trains"))).await
    }

    /// Search trains by route, optionally narrowed to a journey date
    pub async fn search_trains(
        &self,
        source: &str,
        destination: &str,
        date: Option<&str>,
    ) -> Result<Vec<Train>> {
        let mut query = vec![("source", source), ("destination", destination)];
        if let Some(date) = date {
            query.push(("date", date));
        }
        Self::send(self.http.get(self.url("/api/trains/search")).query(&query)).await
    }

    pub async fn bookings(&self) -> Result<Vec<Booking>> {
        Self::send(self.authed(self.http.get(self.url("/api/bookings")))?).await
    }

    pub async fn booking(&self, id: &str) -> Result<Booking> {
        let url = self.url(&format!("/api/bookings/{}", id));
        Self::send(self.authed(self.http.get(url))?).await
    }

    /// Submit the workflow's settlement order and confirm on success
    ///
    /// Refuses to submit unless the machine is in the payment step; a second
    /// call while the first is in flight is rejected by the machine itself.
    /// On any submission failure the settlement is marked failed, leaving
    /// the machine in the payment step for a retry.
    pub async fn submit_booking(&self, workflow: &mut BookingWorkflow) -> Result<Booking> {
        let order = workflow.begin_settlement()?;

        let result: Result<Booking> = async {
            let request = self.authed(self.http.post(self.url("/api/bookings")).json(&order))?;
            Self::send(request).await
        }
        .await;

        match result {
            Ok(booking) => {
                workflow.confirm()?;
                Ok(booking)
            }
            Err(e) => {
                workflow.fail_settlement()?;
                Err(e)
            }
        }
    }

    pub async fn cancel_booking(&self, id: &str) -> Result<Booking> {
        let url = self.url(&format!("/api/bookings/{}/cancel", id));
        Self::send(self.authed(self.http.post(url))?).await
    }

    pub async fn create_station(&self, code: &str, name: &str, city: &str) -> Result<Station> {
        let request = self
            .authed(self.http.post(self.url("/api/admin/stations")))?
            .json(&json!({"code": code, "name": name, "city": city}));
        Self::send(request).await
    }

    pub async fn delete_station(&self, code: &str) -> Result<()> {
        let url = self.url(&format!("/api/admin/stations/{}", code));
        let _: serde_json::Value = Self::send(self.authed(self.http.delete(url))?).await?;
        Ok(())
    }

    pub async fn delete_train(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("/api/admin/trains/{}", id));
        let _: serde_json::Value = Self::send(self.authed(self.http.delete(url))?).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .session
            .token()
            .ok_or_else(|| RailError::AuthenticationError("Not logged in".to_string()))?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| RailError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| RailError::SerializationError(e.to_string()));
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.message,
            Err(_) => format!("HTTP {}", status),
        };

        Err(match status {
            StatusCode::BAD_REQUEST => RailError::InvalidRequest(message),
            StatusCode::UNAUTHORIZED => RailError::AuthenticationError(message),
            StatusCode::FORBIDDEN => RailError::PermissionDenied(message),
            StatusCode::NOT_FOUND => RailError::NotFound(message),
            _ => RailError::NetworkError(message),
        })
    }
}
