use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::place::Place;
use crate::domain::reservation::{Reservation, Review};
use crate::schema::{places, reservation_outbox, reservations, reviews};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = places)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlaceRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub place_type: String,
    pub status: String,
    pub price_per_night: BigDecimal,
    pub cleaning_fee: BigDecimal,
    pub max_guests: i32,
    pub min_stay: Option<i32>,
    pub max_stay: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PlaceRow> for Place {
    type Error = DomainError;

    fn try_from(row: PlaceRow) -> Result<Self, Self::Error> {
        Ok(Place {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            place_type: row.place_type.parse()?,
            status: row.status.parse()?,
            price_per_night: row.price_per_night,
            cleaning_fee: row.cleaning_fee,
            max_guests: row.max_guests,
            min_stay: row.min_stay,
            max_stay: row.max_stay,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = places)]
pub struct NewPlaceRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub place_type: String,
    pub status: String,
    pub price_per_night: BigDecimal,
    pub cleaning_fee: BigDecimal,
    pub max_guests: i32,
    pub min_stay: Option<i32>,
    pub max_stay: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = reservations)]
#[diesel(belongs_to(PlaceRow, foreign_key = place_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReservationRow {
    pub id: Uuid,
    pub reservation_number: String,
    pub place_id: Uuid,
    pub guest_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub nights_price: BigDecimal,
    pub cleaning_fee: BigDecimal,
    pub service_fee: BigDecimal,
    pub total_price: BigDecimal,
    pub status: String,
    pub has_review: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationRow {
    /// The host is the owner of the reserved place, loaded alongside the row.
    pub fn into_domain(self, host_id: Uuid) -> Result<Reservation, DomainError> {
        Ok(Reservation {
            id: self.id,
            reservation_number: self.reservation_number,
            place_id: self.place_id,
            guest_id: self.guest_id,
            host_id,
            check_in: self.check_in,
            check_out: self.check_out,
            guests: self.guests,
            nights_price: self.nights_price,
            cleaning_fee: self.cleaning_fee,
            service_fee: self.service_fee,
            total_price: self.total_price,
            status: self.status.parse()?,
            has_review: self.has_review,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservationRow {
    pub id: Uuid,
    pub reservation_number: String,
    pub place_id: Uuid,
    pub guest_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub nights_price: BigDecimal,
    pub cleaning_fee: BigDecimal,
    pub service_fee: BigDecimal,
    pub total_price: BigDecimal,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub place_id: Uuid,
    pub guest_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            reservation_id: row.reservation_id,
            place_id: row.place_id,
            guest_id: row.guest_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub place_id: Uuid,
    pub guest_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = reservation_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reservation_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}
