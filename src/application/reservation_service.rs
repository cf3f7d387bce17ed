use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::booking::{BookingRequest, ValidationErrors};
use crate::domain::errors::DomainError;
use crate::domain::gate::{self, Actor, Relation, Requester, Transition};
use crate::domain::place::{NewPlace, Place};
use crate::domain::ports::RentalRepository;
use crate::domain::pricing;
use crate::domain::reservation::{
    GuestFilter, HostStats, NewReservation, NewReview, Reservation, Review, MAX_RATING,
    MIN_RATING,
};

pub struct ReservationService<R> {
    repo: R,
}

impl<R: RentalRepository> ReservationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    // ── Places ───────────────────────────────────────────────────────────────

    pub fn create_place(&self, actor: &Actor, place: NewPlace) -> Result<Place, DomainError> {
        if !actor.can_host() {
            return Err(DomainError::Forbidden("only hosts can list places".into()));
        }
        place.validate()?;
        let place = self.repo.create_place(actor.user_id, place)?;
        log::info!("Place {} listed by host {}", place.id, actor.user_id);
        Ok(place)
    }

    pub fn get_place(&self, id: Uuid) -> Result<Place, DomainError> {
        self.repo
            .find_place(id)?
            .ok_or(DomainError::NotFound("Place"))
    }

    pub fn host_places(&self, actor: &Actor) -> Result<Vec<Place>, DomainError> {
        self.repo.list_owner_places(actor.user_id)
    }

    // ── Booking lifecycle ────────────────────────────────────────────────────

    pub fn create_reservation(
        &self,
        actor: &Actor,
        request: BookingRequest,
        today: NaiveDate,
    ) -> Result<Reservation, DomainError> {
        let place = self.get_place(request.place_id)?;
        if !place.is_bookable() {
            return Err(DomainError::InvalidInput(
                "this place is not available for booking".into(),
            ));
        }

        request
            .validate(&place, today)
            .map_err(DomainError::Validation)?;

        let quote = pricing::quote(
            &place.price_per_night,
            &place.cleaning_fee,
            request.check_in,
            request.check_out,
        )
        .ok_or_else(|| DomainError::InvalidInput("empty stay".into()))?;

        let reservation = self.repo.create_reservation(NewReservation::new(
            place.id,
            actor.user_id,
            request.check_in,
            request.check_out,
            request.guests,
            quote,
        ))?;

        log::info!(
            "Reservation {} ({}) created for place {}: {} nights, total {}",
            reservation.reservation_number,
            reservation.id,
            place.id,
            reservation.nights(),
            reservation.total_price
        );
        Ok(reservation)
    }

    /// Visible to the guest, the host of the place and admins.
    pub fn get_reservation(&self, actor: &Actor, id: Uuid) -> Result<Reservation, DomainError> {
        let reservation = self.find_reservation(id)?;
        if Relation::of(actor.user_id, &reservation) == Relation::Outsider && !actor.is_admin() {
            return Err(DomainError::Forbidden(
                "no access to this reservation".into(),
            ));
        }
        Ok(reservation)
    }

    pub fn confirm_reservation(&self, actor: &Actor, id: Uuid) -> Result<Reservation, DomainError> {
        self.transition(actor, id, Transition::Confirm)
    }

    pub fn cancel_reservation(&self, actor: &Actor, id: Uuid) -> Result<Reservation, DomainError> {
        self.transition(actor, id, Transition::Cancel)
    }

    fn transition(
        &self,
        actor: &Actor,
        id: Uuid,
        transition: Transition,
    ) -> Result<Reservation, DomainError> {
        let reservation = self.find_reservation(id)?;
        let relation = Relation::of(actor.user_id, &reservation);

        let next = reservation
            .status
            .apply(transition, Requester::Party(relation))
            .map_err(|e| {
                log::warn!(
                    "Rejected {:?} on reservation {} by user {}: {}",
                    transition,
                    id,
                    actor.user_id,
                    e
                );
                DomainError::from(e)
            })?;

        let updated = self.repo.update_status(id, reservation.status, next)?;
        log::info!(
            "Reservation {} moved {} -> {} by user {}",
            id,
            reservation.status,
            updated.status,
            actor.user_id
        );
        Ok(updated)
    }

    /// Marks confirmed stays whose check-out day has arrived as completed.
    pub fn complete_finished_stays(&self, today: NaiveDate) -> Result<usize, DomainError> {
        let completed = self.repo.complete_finished(today)?;
        if !completed.is_empty() {
            log::info!("Completed {} finished stays", completed.len());
        }
        Ok(completed.len())
    }

    pub fn delete_reservation(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        if !actor.is_admin() {
            return Err(DomainError::Forbidden(
                "only administrators can delete reservations".into(),
            ));
        }
        if !self.repo.delete_reservation(id)? {
            return Err(DomainError::NotFound("Reservation"));
        }
        log::info!("Reservation {} deleted by admin {}", id, actor.user_id);
        Ok(())
    }

    // ── Listings ─────────────────────────────────────────────────────────────

    pub fn guest_reservations(
        &self,
        actor: &Actor,
        filter: GuestFilter,
        today: NaiveDate,
    ) -> Result<Vec<Reservation>, DomainError> {
        self.repo
            .list_guest_reservations(actor.user_id, filter, today)
    }

    pub fn host_reservations(&self, actor: &Actor) -> Result<Vec<Reservation>, DomainError> {
        self.repo.list_host_reservations(actor.user_id)
    }

    pub fn place_reservations(
        &self,
        actor: &Actor,
        place_id: Uuid,
    ) -> Result<Vec<Reservation>, DomainError> {
        let place = self.get_place(place_id)?;
        if place.owner_id != actor.user_id && !actor.is_admin() {
            return Err(DomainError::Forbidden("not the owner of this place".into()));
        }
        self.repo.list_place_reservations(place_id)
    }

    pub fn host_stats(&self, actor: &Actor, now: DateTime<Utc>) -> Result<HostStats, DomainError> {
        if !actor.can_host() {
            return Err(DomainError::Forbidden("host account required".into()));
        }
        self.repo.host_stats(actor.user_id, month_start(now))
    }

    // ── Reviews ──────────────────────────────────────────────────────────────

    pub fn add_review(
        &self,
        actor: &Actor,
        reservation_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            let mut errors = ValidationErrors::new();
            errors.add(
                "rating",
                format!("Rating must be between {MIN_RATING} and {MAX_RATING}"),
            );
            return Err(DomainError::Validation(errors));
        }

        let reservation = self.find_reservation(reservation_id)?;
        if Relation::of(actor.user_id, &reservation) != Relation::Guest {
            return Err(DomainError::Forbidden(
                "only the guest can review a stay".into(),
            ));
        }
        if !gate::can_review(&reservation, actor.user_id) {
            return Err(DomainError::Conflict(format!(
                "a {} reservation{} cannot be reviewed",
                reservation.status.label().to_lowercase(),
                if reservation.has_review { " that already has a review" } else { "" }
            )));
        }

        let review = self.repo.attach_review(NewReview {
            reservation_id,
            place_id: reservation.place_id,
            guest_id: actor.user_id,
            rating,
            comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })?;
        log::info!(
            "Review {} added to reservation {} (rating {})",
            review.id,
            reservation_id,
            rating
        );
        Ok(review)
    }

    pub fn place_reviews(&self, place_id: Uuid) -> Result<Vec<Review>, DomainError> {
        self.get_place(place_id)?;
        self.repo.list_place_reviews(place_id)
    }

    fn find_reservation(&self, id: Uuid) -> Result<Reservation, DomainError> {
        self.repo
            .find_reservation(id)?
            .ok_or(DomainError::NotFound("Reservation"))
    }
}

/// Midnight UTC on the first day of `now`'s month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}
