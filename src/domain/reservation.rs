use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::pricing::PriceQuote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Completed => "COMPLETED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Cancelled => "Cancelled",
            ReservationStatus::Completed => "Completed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ReservationStatus::Cancelled | ReservationStatus::Completed)
    }

    /// Statuses that hold the place's dates.
    pub fn blocks_dates(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ReservationStatus::Pending),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            "COMPLETED" => Ok(ReservationStatus::Completed),
            other => Err(DomainError::Internal(format!(
                "unknown reservation status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: Uuid,
    pub reservation_number: String,
    pub place_id: Uuid,
    pub guest_id: Uuid,
    pub host_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub nights_price: BigDecimal,
    pub cleaning_fee: BigDecimal,
    pub service_fee: BigDecimal,
    pub total_price: BigDecimal,
    pub status: ReservationStatus,
    pub has_review: bool,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Half-open `[check_in, check_out)` ranges: a stay ending on the day
    /// another starts does not overlap it.
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in < check_out && self.check_out > check_in
    }
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub id: Uuid,
    pub place_id: Uuid,
    pub guest_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub quote: PriceQuote,
}

impl NewReservation {
    pub fn new(
        place_id: Uuid,
        guest_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: i32,
        quote: PriceQuote,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            place_id,
            guest_id,
            check_in,
            check_out,
            guests,
            quote,
        }
    }
}

/// `RNT-<year>-<sequence>`, the sequence zero-padded to at least 4 digits.
///
/// Repositories draw `sequence` from a counter that never repeats, so numbers
/// stay unique however many bookings a year holds.
pub fn reservation_number(year: i32, sequence: i64) -> String {
    format!("RNT-{year}-{sequence:04}")
}

/// Which of a guest's reservations to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestFilter {
    All,
    /// Not yet started and still active.
    Upcoming,
    /// Checked out before today.
    Past,
    Cancelled,
}

impl GuestFilter {
    pub fn matches(self, reservation: &Reservation, today: NaiveDate) -> bool {
        match self {
            GuestFilter::All => true,
            GuestFilter::Upcoming => {
                reservation.check_in >= today && reservation.status.blocks_dates()
            }
            GuestFilter::Past => reservation.check_out < today,
            GuestFilter::Cancelled => reservation.status == ReservationStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub place_id: Uuid,
    pub guest_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub reservation_id: Uuid,
    pub place_id: Uuid,
    pub guest_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct HostStats {
    pub active_places: i64,
    pub monthly_reservations: i64,
    pub monthly_revenue: BigDecimal,
    pub average_rating: Option<BigDecimal>,
}

/// Notification events recorded in the outbox alongside each state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationEvent {
    Created,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationEvent {
    pub fn event_type(self) -> &'static str {
        match self {
            ReservationEvent::Created => "ReservationCreated",
            ReservationEvent::Confirmed => "ReservationConfirmed",
            ReservationEvent::Cancelled => "ReservationCancelled",
            ReservationEvent::Completed => "ReservationCompleted",
        }
    }

    pub fn for_status(status: ReservationStatus) -> Self {
        match status {
            ReservationStatus::Pending => ReservationEvent::Created,
            ReservationStatus::Confirmed => ReservationEvent::Confirmed,
            ReservationStatus::Cancelled => ReservationEvent::Cancelled,
            ReservationStatus::Completed => ReservationEvent::Completed,
        }
    }
}

pub const RESERVATION_AGGREGATE: &str = "Reservation";

/// Outbox payload describing a reservation after a state change.
pub fn event_payload(reservation: &Reservation) -> serde_json::Value {
    serde_json::json!({
        "reservation_id": reservation.id,
        "reservation_number": reservation.reservation_number,
        "place_id": reservation.place_id,
        "guest_id": reservation.guest_id,
        "host_id": reservation.host_id,
        "check_in": reservation.check_in,
        "check_out": reservation.check_out,
        "guests": reservation.guests,
        "total_price": reservation.total_price.to_string(),
        "status": reservation.status.as_str(),
    })
}
