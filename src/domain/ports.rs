use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::place::{NewPlace, Place};
use super::reservation::{
    GuestFilter, HostStats, NewReservation, NewReview, Reservation, ReservationStatus, Review,
};

pub trait PlaceRepository: Send + Sync + 'static {
    fn create_place(&self, owner_id: Uuid, place: NewPlace) -> Result<Place, DomainError>;
    fn find_place(&self, id: Uuid) -> Result<Option<Place>, DomainError>;
    fn list_owner_places(&self, owner_id: Uuid) -> Result<Vec<Place>, DomainError>;
}

pub trait ReservationRepository: Send + Sync + 'static {
    /// Inserts the reservation unless a PENDING or CONFIRMED reservation on
    /// the same place overlaps its dates, in which case `Conflict` is
    /// returned. The check and the insert are atomic.
    fn create_reservation(&self, reservation: NewReservation) -> Result<Reservation, DomainError>;
    fn find_reservation(&self, id: Uuid) -> Result<Option<Reservation>, DomainError>;
    fn list_guest_reservations(
        &self,
        guest_id: Uuid,
        filter: GuestFilter,
        today: NaiveDate,
    ) -> Result<Vec<Reservation>, DomainError>;
    fn list_host_reservations(&self, host_id: Uuid) -> Result<Vec<Reservation>, DomainError>;
    fn list_place_reservations(&self, place_id: Uuid) -> Result<Vec<Reservation>, DomainError>;
    /// Moves a reservation from `from` to `to`. Fails with `Conflict` when the
    /// stored status is no longer `from`.
    fn update_status(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<Reservation, DomainError>;
    /// Marks every CONFIRMED reservation checked out on or before `today` as
    /// COMPLETED and returns them.
    fn complete_finished(&self, today: NaiveDate) -> Result<Vec<Reservation>, DomainError>;
    /// Stores the review and flags the reservation as reviewed. Fails with
    /// `Conflict` when the reservation already has one.
    fn attach_review(&self, review: NewReview) -> Result<Review, DomainError>;
    fn list_place_reviews(&self, place_id: Uuid) -> Result<Vec<Review>, DomainError>;
    fn delete_reservation(&self, id: Uuid) -> Result<bool, DomainError>;
    fn host_stats(&self, host_id: Uuid, since: DateTime<Utc>) -> Result<HostStats, DomainError>;
}

/// Everything the reservation service needs from storage.
pub trait RentalRepository: PlaceRepository + ReservationRepository {}

impl<T: PlaceRepository + ReservationRepository> RentalRepository for T {}
