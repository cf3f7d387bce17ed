//! In-process storage with the same semantics as the diesel repository.
//! Backs the handler and service tests and local runs without PostgreSQL.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::place::{NewPlace, Place, PlaceStatus};
use crate::domain::ports::{PlaceRepository, ReservationRepository};
use crate::domain::reservation::{
    reservation_number, GuestFilter, HostStats, NewReservation, NewReview, Reservation, ReservationEvent,
    ReservationStatus, Review,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub aggregate_id: Uuid,
    pub event_type: &'static str,
}

#[derive(Default)]
struct State {
    places: HashMap<Uuid, Place>,
    reservations: HashMap<Uuid, Reservation>,
    reviews: Vec<Review>,
    outbox: Vec<RecordedEvent>,
    last_number: i64,
}

#[derive(Default)]
pub struct InMemoryRentalRepository {
    state: Mutex<State>,
}

impl InMemoryRentalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("repository lock poisoned".into()))
    }

    /// Outbox events recorded so far, oldest first.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state().map(|s| s.outbox.clone()).unwrap_or_default()
    }

    /// Overwrites a reservation's creation time.
    pub fn backdate(&self, id: Uuid, created_at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.state()?;
        let reservation = state
            .reservations
            .get_mut(&id)
            .ok_or(DomainError::NotFound("Reservation"))?;
        reservation.created_at = created_at;
        Ok(())
    }
}

impl State {
    fn record(&mut self, reservation: &Reservation, event: ReservationEvent) {
        self.outbox.push(RecordedEvent {
            aggregate_id: reservation.id,
            event_type: event.event_type(),
        });
    }

    fn newest_first(mut items: Vec<Reservation>) -> Vec<Reservation> {
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }
}

impl PlaceRepository for InMemoryRentalRepository {
    fn create_place(&self, owner_id: Uuid, place: NewPlace) -> Result<Place, DomainError> {
        let place = Place {
            id: Uuid::new_v4(),
            owner_id,
            name: place.name,
            place_type: place.place_type,
            status: place.status,
            price_per_night: place.price_per_night,
            cleaning_fee: place.cleaning_fee,
            max_guests: place.max_guests,
            min_stay: place.min_stay,
            max_stay: place.max_stay,
            created_at: Utc::now(),
        };
        self.state()?.places.insert(place.id, place.clone());
        Ok(place)
    }

    fn find_place(&self, id: Uuid) -> Result<Option<Place>, DomainError> {
        Ok(self.state()?.places.get(&id).cloned())
    }

    fn list_owner_places(&self, owner_id: Uuid) -> Result<Vec<Place>, DomainError> {
        let mut places: Vec<Place> = self
            .state()?
            .places
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        places.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(places)
    }
}

impl ReservationRepository for InMemoryRentalRepository {
    fn create_reservation(&self, new: NewReservation) -> Result<Reservation, DomainError> {
        let mut state = self.state()?;
        let host_id = state
            .places
            .get(&new.place_id)
            .map(|p| p.owner_id)
            .ok_or(DomainError::NotFound("Place"))?;

        let taken = state.reservations.values().any(|r| {
            r.place_id == new.place_id
                && r.status.blocks_dates()
                && r.overlaps(new.check_in, new.check_out)
        });
        if taken {
            return Err(DomainError::Conflict(
                "the selected dates are already booked".into(),
            ));
        }

        state.last_number += 1;
        let number = reservation_number(Utc::now().year(), state.last_number);
        if state
            .reservations
            .values()
            .any(|r| r.reservation_number == number)
        {
            return Err(DomainError::Internal(format!(
                "reservation number {number} already issued"
            )));
        }

        let reservation = Reservation {
            id: new.id,
            reservation_number: number,
            place_id: new.place_id,
            guest_id: new.guest_id,
            host_id,
            check_in: new.check_in,
            check_out: new.check_out,
            guests: new.guests,
            nights_price: new.quote.nights_price,
            cleaning_fee: new.quote.cleaning_fee,
            service_fee: new.quote.service_fee,
            total_price: new.quote.total_price,
            status: ReservationStatus::Pending,
            has_review: false,
            created_at: Utc::now(),
        };
        state.reservations.insert(reservation.id, reservation.clone());
        state.record(&reservation, ReservationEvent::Created);
        Ok(reservation)
    }

    fn find_reservation(&self, id: Uuid) -> Result<Option<Reservation>, DomainError> {
        Ok(self.state()?.reservations.get(&id).cloned())
    }

    fn list_guest_reservations(
        &self,
        guest_id: Uuid,
        filter: GuestFilter,
        today: NaiveDate,
    ) -> Result<Vec<Reservation>, DomainError> {
        let items = self
            .state()?
            .reservations
            .values()
            .filter(|r| r.guest_id == guest_id && filter.matches(r, today))
            .cloned()
            .collect();
        Ok(State::newest_first(items))
    }

    fn list_host_reservations(&self, host_id: Uuid) -> Result<Vec<Reservation>, DomainError> {
        let items = self
            .state()?
            .reservations
            .values()
            .filter(|r| r.host_id == host_id)
            .cloned()
            .collect();
        Ok(State::newest_first(items))
    }

    fn list_place_reservations(&self, place_id: Uuid) -> Result<Vec<Reservation>, DomainError> {
        let items = self
            .state()?
            .reservations
            .values()
            .filter(|r| r.place_id == place_id)
            .cloned()
            .collect();
        Ok(State::newest_first(items))
    }

    fn update_status(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<Reservation, DomainError> {
        let mut state = self.state()?;
        let reservation = state
            .reservations
            .get_mut(&id)
            .ok_or(DomainError::NotFound("Reservation"))?;
        if reservation.status != from {
            return Err(DomainError::Conflict(format!(
                "reservation is {} rather than {}",
                reservation.status, from
            )));
        }
        reservation.status = to;
        let updated = reservation.clone();
        state.record(&updated, ReservationEvent::for_status(to));
        Ok(updated)
    }

    fn complete_finished(&self, today: NaiveDate) -> Result<Vec<Reservation>, DomainError> {
        let mut state = self.state()?;
        let mut completed = Vec::new();
        for reservation in state.reservations.values_mut() {
            if reservation.status == ReservationStatus::Confirmed && reservation.check_out <= today
            {
                reservation.status = ReservationStatus::Completed;
                completed.push(reservation.clone());
            }
        }
        for reservation in &completed {
            state.record(reservation, ReservationEvent::Completed);
        }
        Ok(completed)
    }

    fn attach_review(&self, new: NewReview) -> Result<Review, DomainError> {
        let mut state = self.state()?;
        let reservation = state
            .reservations
            .get_mut(&new.reservation_id)
            .ok_or(DomainError::NotFound("Reservation"))?;
        if reservation.has_review {
            return Err(DomainError::Conflict(
                "this reservation has already been reviewed".into(),
            ));
        }
        reservation.has_review = true;

        let review = Review {
            id: Uuid::new_v4(),
            reservation_id: new.reservation_id,
            place_id: new.place_id,
            guest_id: new.guest_id,
            rating: new.rating,
            comment: new.comment,
            created_at: Utc::now(),
        };
        state.reviews.push(review.clone());
        Ok(review)
    }

    fn list_place_reviews(&self, place_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let mut reviews: Vec<Review> = self
            .state()?
            .reviews
            .iter()
            .filter(|r| r.place_id == place_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    fn delete_reservation(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state()?;
        state.reviews.retain(|r| r.reservation_id != id);
        Ok(state.reservations.remove(&id).is_some())
    }

    fn host_stats(&self, host_id: Uuid, since: DateTime<Utc>) -> Result<HostStats, DomainError> {
        let state = self.state()?;

        let active_places = state
            .places
            .values()
            .filter(|p| p.owner_id == host_id && p.status == PlaceStatus::Active)
            .count() as i64;

        let recent: Vec<&Reservation> = state
            .reservations
            .values()
            .filter(|r| r.host_id == host_id && r.created_at >= since)
            .collect();

        let monthly_revenue = recent
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    ReservationStatus::Confirmed | ReservationStatus::Completed
                )
            })
            .fold(BigDecimal::from(0), |acc, r| acc + &r.total_price);

        let ratings: Vec<i32> = state
            .reviews
            .iter()
            .filter(|review| {
                state
                    .places
                    .get(&review.place_id)
                    .is_some_and(|p| p.owner_id == host_id)
            })
            .map(|review| review.rating)
            .collect();
        let average_rating = if ratings.is_empty() {
            None
        } else {
            let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
            let mean = BigDecimal::from(sum) / BigDecimal::from(ratings.len() as i64);
            Some(mean.with_scale_round(2, RoundingMode::HalfUp))
        };

        Ok(HostStats {
            active_places,
            monthly_reservations: recent.len() as i64,
            monthly_revenue,
            average_rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{Duration, NaiveDate};
    use uuid::Uuid;

    use super::InMemoryRentalRepository;
    use crate::domain::place::{NewPlace, Place, PlaceStatus, PlaceType};
    use crate::domain::ports::{PlaceRepository, ReservationRepository};
    use crate::domain::pricing;
    use crate::domain::reservation::NewReservation;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap() + Duration::days(offset)
    }

    fn seed_place(repo: &InMemoryRentalRepository) -> Place {
        repo.create_place(
            Uuid::new_v4(),
            NewPlace {
                name: "Harbour apartment".into(),
                place_type: PlaceType::Apartment,
                status: PlaceStatus::Active,
                price_per_night: BigDecimal::from_str("200.00").unwrap(),
                cleaning_fee: BigDecimal::from_str("50.00").unwrap(),
                max_guests: 4,
                min_stay: None,
                max_stay: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn reservation_numbers_never_repeat() {
        let repo = InMemoryRentalRepository::new();
        let place = seed_place(&repo);

        // Ids that agree in their last four decimal digits.
        let mut numbers = Vec::new();
        for (n, id) in [7u128, 10_007, 20_007].into_iter().enumerate() {
            let from = n as i64 * 3;
            let quote =
                pricing::quote(&place.price_per_night, &place.cleaning_fee, day(from), day(from + 2))
                    .unwrap();
            let mut new =
                NewReservation::new(place.id, Uuid::new_v4(), day(from), day(from + 2), 1, quote);
            new.id = Uuid::from_u128(id);
            numbers.push(repo.create_reservation(new).unwrap().reservation_number);
        }

        assert!(numbers[0].ends_with("-0001"));
        assert!(numbers[1].ends_with("-0002"));
        assert!(numbers[2].ends_with("-0003"));
    }

    #[test]
    fn overlapping_booking_is_refused_without_using_a_number() {
        let repo = InMemoryRentalRepository::new();
        let place = seed_place(&repo);
        let quote =
            pricing::quote(&place.price_per_night, &place.cleaning_fee, day(0), day(2)).unwrap();

        repo.create_reservation(NewReservation::new(
            place.id,
            Uuid::new_v4(),
            day(0),
            day(2),
            1,
            quote.clone(),
        ))
        .unwrap();
        assert!(repo
            .create_reservation(NewReservation::new(
                place.id,
                Uuid::new_v4(),
                day(1),
                day(3),
                1,
                quote.clone(),
            ))
            .is_err());

        let next = repo
            .create_reservation(NewReservation::new(
                place.id,
                Uuid::new_v4(),
                day(2),
                day(4),
                1,
                quote,
            ))
            .unwrap();
        assert!(next.reservation_number.ends_with("-0002"));
    }
}
