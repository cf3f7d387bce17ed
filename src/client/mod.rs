//! Typed client for the rental REST interface.
//!
//! Requests carry the bearer token of the shared [`SessionContext`]. A 401
//! from any endpoint clears that session, unless it was signed in again
//! with a different token meanwhile. Mutating actions are keyed so a
//! second submission of the same action fails fast while the first one is
//! still pending. Nothing is retried.

pub mod error;
pub mod guard;
pub mod session;

use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub use error::ApiError;
pub use guard::InFlight;
pub use session::{Session, SessionContext, UserProfile};

use crate::domain::booking::{BookingRequest, ValidationErrors};
use crate::domain::gate::{self, ReservationActions};
use crate::domain::place::Place;
use crate::domain::pricing::{self, PriceQuote, QuoteMismatch};
use crate::domain::reservation::Reservation;
use crate::handlers::dto::{
    ApiMessage, CreatePlaceRequest, CreateReservationRequest, CreateReviewRequest,
    HostStatsResponse, PlaceResponse, ReservationResponse, ReviewResponse,
};

/// Outcome of a successful [`ApiClient::book`].
#[derive(Debug, Clone)]
pub struct Booking {
    /// As recorded by the server; its prices are authoritative.
    pub reservation: Reservation,
    pub quote: PriceQuote,
    pub mismatch: Option<QuoteMismatch>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
    in_flight: InFlight,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Self {
        Self::with_http(base_url, session, reqwest::Client::new())
    }

    /// Uses a preconfigured `reqwest::Client`, e.g. one carrying default
    /// headers a gateway expects.
    pub fn with_http(
        base_url: impl Into<String>,
        session: SessionContext,
        http: reqwest::Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            in_flight: InFlight::default(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let token = self.session.token();
        let request = match &token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Session rejected by {}", response.url().path());
            match self.session.clear_if_token(token.as_deref()) {
                Ok(true) => log::info!("Signed out after rejected session"),
                Ok(false) => {}
                Err(e) => log::warn!("Failed to clear session: {}", e),
            }
            return Err(ApiError::SessionExpired);
        }

        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::Api {
                status,
                message: error::normalize_error_body(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.http.get(self.url(path))).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.http.post(self.url(path))).await
    }

    async fn reservations(&self, path: &str) -> Result<Vec<Reservation>, ApiError> {
        let items: Vec<ReservationResponse> = self.get(path).await?;
        Ok(items.into_iter().map(Reservation::from).collect())
    }

    // ── Places ───────────────────────────────────────────────────────────────

    pub async fn create_place(&self, place: &CreatePlaceRequest) -> Result<Place, ApiError> {
        let created: PlaceResponse = self.post("/places", place).await?;
        Ok(created.into())
    }

    pub async fn get_place(&self, id: Uuid) -> Result<Place, ApiError> {
        let place: PlaceResponse = self.get(&format!("/places/{id}")).await?;
        Ok(place.into())
    }

    /// Sends `bytes` as the multipart field `file`.
    pub async fn upload_place_image(
        &self,
        place_id: Uuid,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<serde_json::Value, ApiError> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let request = self
            .http
            .post(self.url(&format!("/files/places/{place_id}/images")))
            .multipart(form);
        self.send(request).await
    }

    // ── Reservations ─────────────────────────────────────────────────────────

    /// Validates and prices the stay locally, then submits it. Local
    /// violations are returned without contacting the server.
    pub async fn book(
        &self,
        place: &Place,
        request: &BookingRequest,
        today: NaiveDate,
    ) -> Result<Booking, ApiError> {
        let _pending = self.in_flight.acquire(format!("book:{}", request.place_id))?;

        request.validate(place, today).map_err(ApiError::Validation)?;
        let quote = pricing::quote(
            &place.price_per_night,
            &place.cleaning_fee,
            request.check_in,
            request.check_out,
        )
        .ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.add("checkOut", "Check-out date must be after the check-in date");
            ApiError::Validation(errors)
        })?;

        let reservation = self.create_reservation(request).await?;
        let mismatch = quote.check_against(&reservation.total_price);
        if let Some(mismatch) = &mismatch {
            log::warn!(
                "Reservation {}: {}",
                reservation.reservation_number,
                mismatch
            );
        }

        Ok(Booking {
            reservation,
            quote,
            mismatch,
        })
    }

    /// Submits a reservation without local checks.
    pub async fn create_reservation(
        &self,
        request: &BookingRequest,
    ) -> Result<Reservation, ApiError> {
        let created: ReservationResponse = self
            .post("/reservations", &CreateReservationRequest::from(request))
            .await?;
        Ok(created.into())
    }

    pub async fn my_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.reservations("/reservations").await
    }

    pub async fn upcoming_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.reservations("/reservations/upcoming").await
    }

    pub async fn past_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.reservations("/reservations/past").await
    }

    pub async fn cancelled_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.reservations("/reservations/cancelled").await
    }

    pub async fn host_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.reservations("/reservations/host").await
    }

    pub async fn get_reservation(&self, id: Uuid) -> Result<Reservation, ApiError> {
        let reservation: ReservationResponse = self.get(&format!("/reservations/{id}")).await?;
        Ok(reservation.into())
    }

    pub async fn confirm_reservation(&self, id: Uuid) -> Result<Reservation, ApiError> {
        let _pending = self.in_flight.acquire(format!("confirm:{id}"))?;
        let updated: ReservationResponse = self
            .post_empty(&format!("/reservations/{id}/confirm"))
            .await?;
        Ok(updated.into())
    }

    pub async fn cancel_reservation(&self, id: Uuid) -> Result<Reservation, ApiError> {
        let _pending = self.in_flight.acquire(format!("cancel:{id}"))?;
        let updated: ReservationResponse = self
            .post_empty(&format!("/reservations/{id}/cancel"))
            .await?;
        Ok(updated.into())
    }

    pub async fn delete_reservation(&self, id: Uuid) -> Result<ApiMessage, ApiError> {
        self.send(self.http.delete(self.url(&format!("/reservations/{id}"))))
            .await
    }

    /// What the signed-in user may do with `reservation`. Signed-out users
    /// may do nothing.
    pub fn actions_for(&self, reservation: &Reservation) -> ReservationActions {
        match self.session.user() {
            Some(user) => gate::actions(reservation, user.id),
            None => ReservationActions::default(),
        }
    }

    // ── Reviews ──────────────────────────────────────────────────────────────

    pub async fn create_review(
        &self,
        review: &CreateReviewRequest,
    ) -> Result<ReviewResponse, ApiError> {
        let _pending = self
            .in_flight
            .acquire(format!("review:{}", review.reservation_id))?;
        self.post("/reviews", review).await
    }

    pub async fn place_reviews(&self, place_id: Uuid) -> Result<Vec<ReviewResponse>, ApiError> {
        self.get(&format!("/reviews/place/{place_id}")).await
    }

    // ── Host dashboard ───────────────────────────────────────────────────────

    pub async fn host_places(&self) -> Result<Vec<Place>, ApiError> {
        let places: Vec<PlaceResponse> = self.get("/host/places").await?;
        Ok(places.into_iter().map(Place::from).collect())
    }

    pub async fn host_place_reservations(
        &self,
        place_id: Uuid,
    ) -> Result<Vec<Reservation>, ApiError> {
        self.reservations(&format!("/host/places/{place_id}/reservations"))
            .await
    }

    pub async fn host_stats(&self) -> Result<HostStatsResponse, ApiError> {
        self.get("/host/stats").await
    }
}
