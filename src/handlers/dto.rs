//! JSON bodies of the REST interface, shared by the handlers and the client.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::booking::BookingRequest;
use crate::domain::place::{NewPlace, Place, PlaceStatus, PlaceType};
use crate::domain::reservation::{HostStats, Reservation, ReservationStatus, Review};

// ── Places ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaceRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub place_type: PlaceType,
    /// Defaults to ACTIVE.
    #[serde(default)]
    pub status: Option<PlaceStatus>,
    /// Decimal amount, e.g. "250.00"
    #[schema(value_type = String)]
    pub price_per_night: BigDecimal,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub cleaning_fee: Option<BigDecimal>,
    pub max_guests: i32,
    #[serde(default)]
    pub min_stay: Option<i32>,
    #[serde(default)]
    pub max_stay: Option<i32>,
}

impl From<CreatePlaceRequest> for NewPlace {
    fn from(req: CreatePlaceRequest) -> Self {
        NewPlace {
            name: req.name,
            place_type: req.place_type,
            status: req.status.unwrap_or(PlaceStatus::Active),
            price_per_night: req.price_per_night,
            cleaning_fee: req.cleaning_fee.unwrap_or_else(|| BigDecimal::from(0)),
            max_guests: req.max_guests,
            min_stay: req.min_stay,
            max_stay: req.max_stay,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub place_type: PlaceType,
    pub type_label: String,
    pub status: PlaceStatus,
    #[schema(value_type = String)]
    pub price_per_night: BigDecimal,
    #[schema(value_type = String)]
    pub cleaning_fee: BigDecimal,
    pub max_guests: i32,
    pub min_stay: Option<i32>,
    pub max_stay: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<Place> for PlaceResponse {
    fn from(p: Place) -> Self {
        PlaceResponse {
            id: p.id,
            owner_id: p.owner_id,
            name: p.name,
            place_type: p.place_type,
            type_label: p.place_type.label().to_string(),
            status: p.status,
            price_per_night: p.price_per_night,
            cleaning_fee: p.cleaning_fee,
            max_guests: p.max_guests,
            min_stay: p.min_stay,
            max_stay: p.max_stay,
            created_at: p.created_at,
        }
    }
}

impl From<PlaceResponse> for Place {
    fn from(p: PlaceResponse) -> Self {
        Place {
            id: p.id,
            owner_id: p.owner_id,
            name: p.name,
            place_type: p.place_type,
            status: p.status,
            price_per_night: p.price_per_night,
            cleaning_fee: p.cleaning_fee,
            max_guests: p.max_guests,
            min_stay: p.min_stay,
            max_stay: p.max_stay,
            created_at: p.created_at,
        }
    }
}

// ── Reservations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub place_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
}

impl From<CreateReservationRequest> for BookingRequest {
    fn from(req: CreateReservationRequest) -> Self {
        BookingRequest {
            place_id: req.place_id,
            check_in: req.check_in,
            check_out: req.check_out,
            guests: req.guests,
        }
    }
}

impl From<&BookingRequest> for CreateReservationRequest {
    fn from(req: &BookingRequest) -> Self {
        CreateReservationRequest {
            place_id: req.place_id,
            check_in: req.check_in,
            check_out: req.check_out,
            guests: req.guests,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: Uuid,
    pub reservation_number: String,
    pub place_id: Uuid,
    /// The guest who booked the stay.
    pub user_id: Uuid,
    pub host_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub nights: i64,
    #[schema(value_type = String)]
    pub nights_price: BigDecimal,
    #[schema(value_type = String)]
    pub cleaning_fee: BigDecimal,
    #[schema(value_type = String)]
    pub service_fee: BigDecimal,
    #[schema(value_type = String)]
    pub total_price: BigDecimal,
    pub status: ReservationStatus,
    pub status_label: String,
    pub has_review: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        ReservationResponse {
            id: r.id,
            nights: r.nights(),
            reservation_number: r.reservation_number,
            place_id: r.place_id,
            user_id: r.guest_id,
            host_id: r.host_id,
            check_in: r.check_in,
            check_out: r.check_out,
            guests: r.guests,
            nights_price: r.nights_price,
            cleaning_fee: r.cleaning_fee,
            service_fee: r.service_fee,
            total_price: r.total_price,
            status: r.status,
            status_label: r.status.label().to_string(),
            has_review: r.has_review,
            created_at: r.created_at,
        }
    }
}

impl From<ReservationResponse> for Reservation {
    fn from(r: ReservationResponse) -> Self {
        Reservation {
            id: r.id,
            reservation_number: r.reservation_number,
            place_id: r.place_id,
            guest_id: r.user_id,
            host_id: r.host_id,
            check_in: r.check_in,
            check_out: r.check_out,
            guests: r.guests,
            nights_price: r.nights_price,
            cleaning_fee: r.cleaning_fee,
            service_fee: r.service_fee,
            total_price: r.total_price,
            status: r.status,
            has_review: r.has_review,
            created_at: r.created_at,
        }
    }
}

// ── Reviews ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub reservation_id: Uuid,
    /// 1 to 10
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        ReviewResponse {
            id: r.id,
            reservation_id: r.reservation_id,
            place_id: r.place_id,
            user_id: r.guest_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

// ── Host dashboard ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostStatsResponse {
    pub active_places: i64,
    pub monthly_reservations: i64,
    #[schema(value_type = String)]
    pub monthly_revenue: BigDecimal,
    #[schema(value_type = Option<String>)]
    pub average_rating: Option<BigDecimal>,
}

impl From<HostStats> for HostStatsResponse {
    fn from(s: HostStats) -> Self {
        HostStatsResponse {
            active_places: s.active_places,
            monthly_reservations: s.monthly_reservations,
            monthly_revenue: s.monthly_revenue,
            average_rating: s.average_rating,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
