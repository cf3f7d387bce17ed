//! Who may do what to a reservation, and in which state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::reservation::{Reservation, ReservationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Guest,
    Host,
    Admin,
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GUEST" | "USER" => Ok(UserRole::Guest),
            "HOST" => Ok(UserRole::Host),
            "ADMIN" => Ok(UserRole::Admin),
            other => Err(DomainError::InvalidInput(format!("unknown role '{other}'"))),
        }
    }
}

/// The authenticated user performing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn can_host(&self) -> bool {
        matches!(self.role, UserRole::Host | UserRole::Admin)
    }
}

/// How a user relates to one particular reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Guest,
    Host,
    Outsider,
}

impl Relation {
    pub fn of(user_id: Uuid, reservation: &Reservation) -> Self {
        if reservation.guest_id == user_id {
            Relation::Guest
        } else if reservation.host_id == user_id {
            Relation::Host
        } else {
            Relation::Outsider
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Confirm,
    Cancel,
    /// Applied by the service once the stay is over; never requested by a user.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    Party(Relation),
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    Forbidden(Transition),
    InvalidState {
        transition: Transition,
        from: ReservationStatus,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::Forbidden(t) => write!(f, "not allowed to {}", t.verb()),
            TransitionError::InvalidState { transition, from } => write!(
                f,
                "a {} reservation cannot be {}",
                from.label().to_lowercase(),
                transition.past_participle()
            ),
        }
    }
}

impl From<TransitionError> for DomainError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::Forbidden(_) => DomainError::Forbidden(e.to_string()),
            TransitionError::InvalidState { .. } => DomainError::Conflict(e.to_string()),
        }
    }
}

impl Transition {
    fn verb(self) -> &'static str {
        match self {
            Transition::Confirm => "confirm this reservation",
            Transition::Cancel => "cancel this reservation",
            Transition::Complete => "complete this reservation",
        }
    }

    fn past_participle(self) -> &'static str {
        match self {
            Transition::Confirm => "confirmed",
            Transition::Cancel => "cancelled",
            Transition::Complete => "completed",
        }
    }

    fn allowed_for(self, requester: Requester) -> bool {
        match (self, requester) {
            (Transition::Confirm, Requester::Party(Relation::Host)) => true,
            (Transition::Cancel, Requester::Party(Relation::Guest | Relation::Host)) => true,
            (Transition::Complete, Requester::System) => true,
            _ => false,
        }
    }
}

impl ReservationStatus {
    /// The status reached by applying `transition`, checking who asks first
    /// and the current state second.
    pub fn apply(
        self,
        transition: Transition,
        requester: Requester,
    ) -> Result<ReservationStatus, TransitionError> {
        if !transition.allowed_for(requester) {
            return Err(TransitionError::Forbidden(transition));
        }
        use ReservationStatus::*;
        match (transition, self) {
            (Transition::Confirm, Pending) => Ok(Confirmed),
            (Transition::Cancel, Pending | Confirmed) => Ok(Cancelled),
            (Transition::Complete, Confirmed) => Ok(Completed),
            (transition, from) => Err(TransitionError::InvalidState { transition, from }),
        }
    }
}

pub fn can_cancel(reservation: &Reservation) -> bool {
    matches!(
        reservation.status,
        ReservationStatus::Pending | ReservationStatus::Confirmed
    )
}

pub fn can_confirm(reservation: &Reservation, user_id: Uuid) -> bool {
    Relation::of(user_id, reservation) == Relation::Host
        && reservation.status == ReservationStatus::Pending
}

pub fn can_review(reservation: &Reservation, user_id: Uuid) -> bool {
    Relation::of(user_id, reservation) == Relation::Guest
        && matches!(
            reservation.status,
            ReservationStatus::Completed | ReservationStatus::Cancelled
        )
        && !reservation.has_review
}

/// The actions a reservation screen exposes to one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReservationActions {
    pub cancel: bool,
    pub confirm: bool,
    pub review: bool,
}

pub fn actions(reservation: &Reservation, user_id: Uuid) -> ReservationActions {
    let related = Relation::of(user_id, reservation) != Relation::Outsider;
    ReservationActions {
        cancel: related && can_cancel(reservation),
        confirm: can_confirm(reservation, user_id),
        review: can_review(reservation, user_id),
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;

    fn reservation(status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            reservation_number: "RNT-2026-0042".into(),
            place_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            check_in: "2026-07-01".parse().unwrap(),
            check_out: "2026-07-04".parse().unwrap(),
            guests: 2,
            nights_price: BigDecimal::from(600),
            cleaning_fee: BigDecimal::from(50),
            service_fee: BigDecimal::from(30),
            total_price: BigDecimal::from(680),
            status,
            has_review: false,
            created_at: Utc::now(),
        }
    }

    const GUEST: Requester = Requester::Party(Relation::Guest);
    const HOST: Requester = Requester::Party(Relation::Host);
    const OUTSIDER: Requester = Requester::Party(Relation::Outsider);

    #[test]
    fn host_confirms_pending() {
        assert_eq!(
            ReservationStatus::Pending.apply(Transition::Confirm, HOST),
            Ok(ReservationStatus::Confirmed)
        );
    }

    #[test]
    fn guest_cannot_confirm() {
        assert_eq!(
            ReservationStatus::Pending.apply(Transition::Confirm, GUEST),
            Err(TransitionError::Forbidden(Transition::Confirm))
        );
    }

    #[test]
    fn confirming_twice_is_an_invalid_state() {
        assert!(matches!(
            ReservationStatus::Confirmed.apply(Transition::Confirm, HOST),
            Err(TransitionError::InvalidState { .. })
        ));
    }

    #[test]
    fn either_party_cancels_active_reservations() {
        for from in [ReservationStatus::Pending, ReservationStatus::Confirmed] {
            assert_eq!(from.apply(Transition::Cancel, GUEST), Ok(ReservationStatus::Cancelled));
            assert_eq!(from.apply(Transition::Cancel, HOST), Ok(ReservationStatus::Cancelled));
        }
        assert!(ReservationStatus::Pending.apply(Transition::Cancel, OUTSIDER).is_err());
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for from in [ReservationStatus::Cancelled, ReservationStatus::Completed] {
            assert!(from.apply(Transition::Cancel, GUEST).is_err());
            assert!(from.apply(Transition::Confirm, HOST).is_err());
            assert!(from.apply(Transition::Complete, Requester::System).is_err());
        }
    }

    #[test]
    fn only_the_system_completes_stays() {
        assert_eq!(
            ReservationStatus::Confirmed.apply(Transition::Complete, Requester::System),
            Ok(ReservationStatus::Completed)
        );
        assert!(ReservationStatus::Confirmed.apply(Transition::Complete, HOST).is_err());
        assert!(ReservationStatus::Pending
            .apply(Transition::Complete, Requester::System)
            .is_err());
    }

    #[test]
    fn transition_errors_map_to_domain_errors() {
        let forbidden: DomainError = TransitionError::Forbidden(Transition::Confirm).into();
        assert!(matches!(forbidden, DomainError::Forbidden(_)));

        let invalid: DomainError = TransitionError::InvalidState {
            transition: Transition::Cancel,
            from: ReservationStatus::Completed,
        }
        .into();
        assert!(matches!(invalid, DomainError::Conflict(_)));
        assert_eq!(
            invalid.to_string(),
            "Conflict: a completed reservation cannot be cancelled"
        );
    }

    #[test]
    fn cancel_gate_follows_status_only() {
        assert!(can_cancel(&reservation(ReservationStatus::Pending)));
        assert!(can_cancel(&reservation(ReservationStatus::Confirmed)));
        assert!(!can_cancel(&reservation(ReservationStatus::Cancelled)));
        assert!(!can_cancel(&reservation(ReservationStatus::Completed)));
    }

    #[test]
    fn only_the_host_sees_confirm() {
        let r = reservation(ReservationStatus::Pending);
        assert!(can_confirm(&r, r.host_id));
        assert!(!can_confirm(&r, r.guest_id));
        assert!(!can_confirm(&reservation(ReservationStatus::Confirmed), r.host_id));
    }

    #[test]
    fn review_opens_after_completion_and_closes_once_written() {
        let mut r = reservation(ReservationStatus::Completed);
        assert!(can_review(&r, r.guest_id));
        assert!(!can_review(&r, r.host_id));

        r.has_review = true;
        assert!(!can_review(&r, r.guest_id));
    }

    #[test]
    fn cancelled_stays_can_be_reviewed() {
        let r = reservation(ReservationStatus::Cancelled);
        assert!(can_review(&r, r.guest_id));
        assert!(!can_review(&reservation(ReservationStatus::Confirmed), r.guest_id));
    }

    #[test]
    fn gate_is_a_pure_function_of_its_inputs() {
        let r = reservation(ReservationStatus::Pending);
        assert_eq!(actions(&r, r.host_id), actions(&r, r.host_id));
        assert_eq!(actions(&r, r.guest_id), actions(&r, r.guest_id));
    }

    #[test]
    fn actions_for_each_viewer() {
        let r = reservation(ReservationStatus::Pending);
        assert_eq!(
            actions(&r, r.host_id),
            ReservationActions { cancel: true, confirm: true, review: false }
        );
        assert_eq!(
            actions(&r, r.guest_id),
            ReservationActions { cancel: true, confirm: false, review: false }
        );
        assert_eq!(actions(&r, Uuid::new_v4()), ReservationActions::default());
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("host".parse::<UserRole>().unwrap(), UserRole::Host);
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("root".parse::<UserRole>().is_err());
    }
}
