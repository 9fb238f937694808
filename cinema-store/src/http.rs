//! reqwest-backed implementation of the backend port.

use async_trait::async_trait;
use cinema_core::{ApiError, ApiResult, CinemaApi};
use cinema_shared::{
    ApiMessage, AuthToken, Booking, BookingCreated, Cinema, CreateBookingRequest, Credentials, Movie,
    MovieSession, SessionDetails, Settings,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_config::ApiConfig;
use crate::location::Location;
use crate::stores::AuthStore;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    auth: Arc<AuthStore>,
    location: Arc<Location>,
}

impl HttpClient {
    pub fn new(config: &ApiConfig, auth: Arc<AuthStore>, location: Arc<Location>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
            location,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send(self.client.get(self.url(path))).await?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.post(self.url(path)).json(body)).await?;
        decode(response).await
    }

    /// Attach the bearer token, send, and turn non-2xx into `ApiError::Http`.
    ///
    /// A 401 drops the stored token and sends the user to the login page.
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let request = match self.auth.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ApiMessage>()
            .await
            .ok()
            .and_then(|body| body.message);

        if status == StatusCode::UNAUTHORIZED {
            warn!("Unauthorized response, dropping auth token");
            self.auth.clear_token().await;
            if !self.location.redirect_to_login().await {
                debug!("Already on an auth page, not redirecting");
            }
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl CinemaApi for HttpClient {
    async fn list_movies(&self) -> ApiResult<Vec<Movie>> {
        self.get("/movies").await
    }

    async fn movie_sessions(&self, movie_id: i64) -> ApiResult<Vec<MovieSession>> {
        self.get(&format!("/movies/{}/sessions", movie_id)).await
    }

    async fn list_cinemas(&self) -> ApiResult<Vec<Cinema>> {
        self.get("/cinemas").await
    }

    async fn cinema_sessions(&self, cinema_id: i64) -> ApiResult<Vec<MovieSession>> {
        self.get(&format!("/cinemas/{}/sessions", cinema_id)).await
    }

    async fn session_details(&self, session_id: i64) -> ApiResult<SessionDetails> {
        self.get(&format!("/movieSessions/{}", session_id)).await
    }

    async fn create_booking(&self, session_id: i64, request: &CreateBookingRequest) -> ApiResult<BookingCreated> {
        self.post(&format!("/movieSessions/{}/bookings", session_id), request)
            .await
    }

    async fn my_bookings(&self) -> ApiResult<Vec<Booking>> {
        self.get("/me/bookings").await
    }

    async fn pay_booking(&self, booking_id: &str) -> ApiResult<()> {
        // Response body carries nothing we use
        self.send(self.client.post(self.url(&format!("/bookings/{}/payments", booking_id))))
            .await?;
        Ok(())
    }

    async fn settings(&self) -> ApiResult<Settings> {
        self.get("/settings").await
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        self.post("/login", credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        self.post("/register", credentials).await
    }
}
