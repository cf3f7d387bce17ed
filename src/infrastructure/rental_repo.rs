use std::collections::HashMap;

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use diesel::dsl::{avg, sql, sum};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::place::{NewPlace, Place, PlaceStatus};
use crate::domain::ports::{PlaceRepository, ReservationRepository};
use crate::domain::reservation::{
    event_payload, reservation_number, GuestFilter, HostStats, NewReservation, NewReview, Reservation,
    ReservationEvent, ReservationStatus, Review, RESERVATION_AGGREGATE,
};
use crate::schema::{places, reservation_outbox, reservations, reviews};

use super::models::{
    NewOutboxEventRow, NewPlaceRow, NewReservationRow, NewReviewRow, PlaceRow, ReservationRow,
    ReviewRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

const ACTIVE_STATUSES: [&str; 2] = ["PENDING", "CONFIRMED"];
const EARNING_STATUSES: [&str; 2] = ["CONFIRMED", "COMPLETED"];

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselRentalRepository {
    pool: DbPool,
}

impl DieselRentalRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Writes the notification event for `reservation` in the caller's
/// transaction. A relay outside this service publishes the rows.
fn record_event(
    conn: &mut PgConnection,
    reservation: &Reservation,
    event: ReservationEvent,
) -> Result<(), DomainError> {
    diesel::insert_into(reservation_outbox::table)
        .values(&NewOutboxEventRow {
            id: Uuid::new_v4(),
            aggregate_type: RESERVATION_AGGREGATE.to_string(),
            aggregate_id: reservation.id.to_string(),
            event_type: event.event_type().to_string(),
            payload: event_payload(reservation),
        })
        .execute(conn)?;
    Ok(())
}

fn load_reservation(conn: &mut PgConnection, id: Uuid) -> Result<Option<Reservation>, DomainError> {
    reservations::table
        .inner_join(places::table)
        .filter(reservations::id.eq(id))
        .select((ReservationRow::as_select(), places::owner_id))
        .first::<(ReservationRow, Uuid)>(conn)
        .optional()?
        .map(|(row, host_id)| row.into_domain(host_id))
        .transpose()
}

fn into_reservations(rows: Vec<(ReservationRow, Uuid)>) -> Result<Vec<Reservation>, DomainError> {
    rows.into_iter()
        .map(|(row, host_id)| row.into_domain(host_id))
        .collect()
}

impl PlaceRepository for DieselRentalRepository {
    fn create_place(&self, owner_id: Uuid, place: NewPlace) -> Result<Place, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(places::table)
            .values(&NewPlaceRow {
                id: Uuid::new_v4(),
                owner_id,
                name: place.name,
                place_type: place.place_type.as_str().to_string(),
                status: place.status.as_str().to_string(),
                price_per_night: place.price_per_night,
                cleaning_fee: place.cleaning_fee,
                max_guests: place.max_guests,
                min_stay: place.min_stay,
                max_stay: place.max_stay,
            })
            .returning(PlaceRow::as_returning())
            .get_result(&mut conn)?;

        row.try_into()
    }

    fn find_place(&self, id: Uuid) -> Result<Option<Place>, DomainError> {
        let mut conn = self.pool.get()?;

        places::table
            .filter(places::id.eq(id))
            .select(PlaceRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Place::try_from)
            .transpose()
    }

    fn list_owner_places(&self, owner_id: Uuid) -> Result<Vec<Place>, DomainError> {
        let mut conn = self.pool.get()?;

        places::table
            .filter(places::owner_id.eq(owner_id))
            .select(PlaceRow::as_select())
            .order(places::created_at.desc())
            .load(&mut conn)?
            .into_iter()
            .map(Place::try_from)
            .collect()
    }
}

impl ReservationRepository for DieselRentalRepository {
    fn create_reservation(&self, new: NewReservation) -> Result<Reservation, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the place so concurrent bookings of it serialize here.
            let host_id: Uuid = places::table
                .filter(places::id.eq(new.place_id))
                .select(places::owner_id)
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Place"))?;

            // 2. Reject overlaps with reservations still holding their dates.
            let overlapping: i64 = reservations::table
                .filter(reservations::place_id.eq(new.place_id))
                .filter(reservations::status.eq_any(ACTIVE_STATUSES))
                .filter(reservations::check_in.lt(new.check_out))
                .filter(reservations::check_out.gt(new.check_in))
                .count()
                .get_result(conn)?;
            if overlapping > 0 {
                return Err(DomainError::Conflict(
                    "the selected dates are already booked".into(),
                ));
            }

            // 3. Number it from the sequence and insert.
            let sequence: i64 =
                diesel::select(sql::<BigInt>("nextval('reservation_number_seq')"))
                    .get_result(conn)?;
            let row = diesel::insert_into(reservations::table)
                .values(&NewReservationRow {
                    id: new.id,
                    reservation_number: reservation_number(Utc::now().year(), sequence),
                    place_id: new.place_id,
                    guest_id: new.guest_id,
                    check_in: new.check_in,
                    check_out: new.check_out,
                    guests: new.guests,
                    nights_price: new.quote.nights_price,
                    cleaning_fee: new.quote.cleaning_fee,
                    service_fee: new.quote.service_fee,
                    total_price: new.quote.total_price,
                    status: ReservationStatus::Pending.as_str().to_string(),
                })
                .returning(ReservationRow::as_returning())
                .get_result(conn)?;
            let reservation = row.into_domain(host_id)?;

            // 4. Outbox event in the same transaction.
            record_event(conn, &reservation, ReservationEvent::Created)?;

            Ok(reservation)
        })
    }

    fn find_reservation(&self, id: Uuid) -> Result<Option<Reservation>, DomainError> {
        let mut conn = self.pool.get()?;
        load_reservation(&mut conn, id)
    }

    fn list_guest_reservations(
        &self,
        guest_id: Uuid,
        filter: GuestFilter,
        today: NaiveDate,
    ) -> Result<Vec<Reservation>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = reservations::table
            .inner_join(places::table)
            .filter(reservations::guest_id.eq(guest_id))
            .select((ReservationRow::as_select(), places::owner_id))
            .order(reservations::created_at.desc())
            .into_boxed();

        query = match filter {
            GuestFilter::All => query,
            GuestFilter::Upcoming => query
                .filter(reservations::check_in.ge(today))
                .filter(reservations::status.eq_any(ACTIVE_STATUSES)),
            GuestFilter::Past => query.filter(reservations::check_out.lt(today)),
            GuestFilter::Cancelled => {
                query.filter(reservations::status.eq(ReservationStatus::Cancelled.as_str()))
            }
        };

        into_reservations(query.load::<(ReservationRow, Uuid)>(&mut conn)?)
    }

    fn list_host_reservations(&self, host_id: Uuid) -> Result<Vec<Reservation>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = reservations::table
            .inner_join(places::table)
            .filter(places::owner_id.eq(host_id))
            .select((ReservationRow::as_select(), places::owner_id))
            .order(reservations::created_at.desc())
            .load::<(ReservationRow, Uuid)>(&mut conn)?;

        into_reservations(rows)
    }

    fn list_place_reservations(&self, place_id: Uuid) -> Result<Vec<Reservation>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = reservations::table
            .inner_join(places::table)
            .filter(reservations::place_id.eq(place_id))
            .select((ReservationRow::as_select(), places::owner_id))
            .order(reservations::created_at.desc())
            .load::<(ReservationRow, Uuid)>(&mut conn)?;

        into_reservations(rows)
    }

    fn update_status(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<Reservation, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Compare-and-set: a concurrent change makes this match no rows.
            let updated = diesel::update(
                reservations::table
                    .filter(reservations::id.eq(id))
                    .filter(reservations::status.eq(from.as_str())),
            )
            .set((
                reservations::status.eq(to.as_str()),
                reservations::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

            let reservation = load_reservation(conn, id)?.ok_or(DomainError::NotFound("Reservation"))?;
            if updated == 0 {
                return Err(DomainError::Conflict(format!(
                    "reservation is {} rather than {}",
                    reservation.status, from
                )));
            }

            record_event(conn, &reservation, ReservationEvent::for_status(to))?;
            Ok(reservation)
        })
    }

    fn complete_finished(&self, today: NaiveDate) -> Result<Vec<Reservation>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows: Vec<ReservationRow> = diesel::update(
                reservations::table
                    .filter(reservations::status.eq(ReservationStatus::Confirmed.as_str()))
                    .filter(reservations::check_out.le(today)),
            )
            .set((
                reservations::status.eq(ReservationStatus::Completed.as_str()),
                reservations::updated_at.eq(Utc::now()),
            ))
            .returning(ReservationRow::as_returning())
            .get_results(conn)?;

            if rows.is_empty() {
                return Ok(Vec::new());
            }

            let place_ids: Vec<Uuid> = rows.iter().map(|r| r.place_id).collect();
            let owners: HashMap<Uuid, Uuid> = places::table
                .filter(places::id.eq_any(&place_ids))
                .select((places::id, places::owner_id))
                .load::<(Uuid, Uuid)>(conn)?
                .into_iter()
                .collect();

            let mut completed = Vec::with_capacity(rows.len());
            for row in rows {
                let host_id = owners
                    .get(&row.place_id)
                    .copied()
                    .ok_or(DomainError::NotFound("Place"))?;
                let reservation = row.into_domain(host_id)?;
                record_event(conn, &reservation, ReservationEvent::Completed)?;
                completed.push(reservation);
            }
            Ok(completed)
        })
    }

    fn attach_review(&self, new: NewReview) -> Result<Review, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let flagged = diesel::update(
                reservations::table
                    .filter(reservations::id.eq(new.reservation_id))
                    .filter(reservations::has_review.eq(false)),
            )
            .set((
                reservations::has_review.eq(true),
                reservations::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

            if flagged == 0 {
                let exists: i64 = reservations::table
                    .filter(reservations::id.eq(new.reservation_id))
                    .count()
                    .get_result(conn)?;
                return Err(if exists == 0 {
                    DomainError::NotFound("Reservation")
                } else {
                    DomainError::Conflict("this reservation has already been reviewed".into())
                });
            }

            let row = diesel::insert_into(reviews::table)
                .values(&NewReviewRow {
                    id: Uuid::new_v4(),
                    reservation_id: new.reservation_id,
                    place_id: new.place_id,
                    guest_id: new.guest_id,
                    rating: new.rating,
                    comment: new.comment,
                })
                .returning(ReviewRow::as_returning())
                .get_result(conn)?;

            Ok(row.into())
        })
    }

    fn list_place_reviews(&self, place_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = reviews::table
            .filter(reviews::place_id.eq(place_id))
            .select(ReviewRow::as_select())
            .order(reviews::created_at.desc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    fn delete_reservation(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::delete(reviews::table.filter(reviews::reservation_id.eq(id))).execute(conn)?;
            let deleted =
                diesel::delete(reservations::table.filter(reservations::id.eq(id))).execute(conn)?;
            Ok(deleted > 0)
        })
    }

    fn host_stats(&self, host_id: Uuid, since: DateTime<Utc>) -> Result<HostStats, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let active_places: i64 = places::table
                .filter(places::owner_id.eq(host_id))
                .filter(places::status.eq(PlaceStatus::Active.as_str()))
                .count()
                .get_result(conn)?;

            let monthly_reservations: i64 = reservations::table
                .inner_join(places::table)
                .filter(places::owner_id.eq(host_id))
                .filter(reservations::created_at.ge(since))
                .count()
                .get_result(conn)?;

            let monthly_revenue: Option<BigDecimal> = reservations::table
                .inner_join(places::table)
                .filter(places::owner_id.eq(host_id))
                .filter(reservations::created_at.ge(since))
                .filter(reservations::status.eq_any(EARNING_STATUSES))
                .select(sum(reservations::total_price))
                .first(conn)?;

            let average_rating: Option<BigDecimal> = reviews::table
                .inner_join(places::table)
                .filter(places::owner_id.eq(host_id))
                .select(avg(reviews::rating))
                .first(conn)?;

            Ok(HostStats {
                active_places,
                monthly_reservations,
                monthly_revenue: monthly_revenue.unwrap_or_else(|| BigDecimal::from(0)),
                average_rating: average_rating.map(|a| a.with_scale_round(2, RoundingMode::HalfUp)),
            })
        })
    }
}
