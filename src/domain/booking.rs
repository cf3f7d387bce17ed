use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::place::Place;
use super::pricing;

/// Field name to message, one entry per violated field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub place_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
}

impl BookingRequest {
    /// Checks the request against the place's limits. Runs in the client
    /// before submission and again in the service, which has the final say
    /// (date conflicts with other bookings are only detectable there).
    pub fn validate(&self, place: &Place, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.check_in < today {
            errors.add("checkIn", "Check-in date cannot be in the past");
        }

        if self.check_out <= self.check_in {
            errors.add("checkOut", "Check-out date must be after the check-in date");
        } else {
            let nights = (self.check_out - self.check_in).num_days();
            if let Some(min) = place.min_stay.filter(|m| *m > 0) {
                if nights < i64::from(min) {
                    errors.add("checkOut", format!("Minimum stay is {min} nights"));
                }
            }
            if let Some(max) = place.max_stay.filter(|m| *m > 0) {
                if nights > i64::from(max) {
                    errors.add("checkOut", format!("Maximum stay is {max} nights"));
                }
            }
            let total = pricing::quote(
                &place.price_per_night,
                &place.cleaning_fee,
                self.check_in,
                self.check_out,
            )
            .map(|q| q.total_price);
            if total.is_some_and(|t| !pricing::fits_amount(&t)) {
                errors.add("checkOut", "The total for this stay is too large, choose fewer nights");
            }
        }

        if self.guests < 1 {
            errors.add("guests", "At least 1 guest is required");
        } else if self.guests > place.max_guests {
            errors.add(
                "guests",
                format!("This place accepts at most {} guests", place.max_guests),
            );
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::domain::place::{PlaceStatus, PlaceType};

    fn place() -> Place {
        Place {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Old town studio".into(),
            place_type: PlaceType::Studio,
            status: PlaceStatus::Active,
            price_per_night: BigDecimal::from(200),
            cleaning_fee: BigDecimal::from(50),
            max_guests: 3,
            min_stay: None,
            max_stay: None,
            created_at: Utc::now(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn request(check_in: &str, check_out: &str, guests: i32) -> BookingRequest {
        BookingRequest {
            place_id: Uuid::new_v4(),
            check_in: day(check_in),
            check_out: day(check_out),
            guests,
        }
    }

    const TODAY: &str = "2026-07-01";

    #[test]
    fn valid_request_passes() {
        assert!(request("2026-07-01", "2026-07-04", 2)
            .validate(&place(), day(TODAY))
            .is_ok());
    }

    #[test]
    fn checkout_on_or_before_checkin_is_rejected() {
        let errors = request("2026-07-05", "2026-07-05", 2)
            .validate(&place(), day(TODAY))
            .unwrap_err();
        assert!(errors.get("checkOut").is_some());

        let errors = request("2026-07-05", "2026-07-03", 2)
            .validate(&place(), day(TODAY))
            .unwrap_err();
        assert!(errors.get("checkOut").is_some());
    }

    #[test]
    fn checkin_in_the_past_is_rejected() {
        let errors = request("2026-06-30", "2026-07-03", 2)
            .validate(&place(), day(TODAY))
            .unwrap_err();
        assert!(errors.get("checkIn").is_some());
    }

    #[test]
    fn too_many_guests_is_rejected() {
        let errors = request("2026-07-02", "2026-07-03", 4)
            .validate(&place(), day(TODAY))
            .unwrap_err();
        assert_eq!(errors.get("guests"), Some("This place accepts at most 3 guests"));
    }

    #[test]
    fn zero_guests_is_rejected() {
        let errors = request("2026-07-02", "2026-07-03", 0)
            .validate(&place(), day(TODAY))
            .unwrap_err();
        assert!(errors.get("guests").is_some());
    }

    #[test]
    fn every_violation_is_reported() {
        let errors = request("2026-06-20", "2026-06-19", 9)
            .validate(&place(), day(TODAY))
            .unwrap_err();
        assert_eq!(errors.iter().count(), 3);
    }

    #[test]
    fn stay_length_limits() {
        let mut p = place();
        p.min_stay = Some(2);
        p.max_stay = Some(5);

        let short = request("2026-07-02", "2026-07-03", 1).validate(&p, day(TODAY));
        assert_eq!(short.unwrap_err().get("checkOut"), Some("Minimum stay is 2 nights"));

        let long = request("2026-07-02", "2026-07-09", 1).validate(&p, day(TODAY));
        assert_eq!(long.unwrap_err().get("checkOut"), Some("Maximum stay is 5 nights"));

        assert!(request("2026-07-02", "2026-07-05", 1).validate(&p, day(TODAY)).is_ok());
    }

    #[test]
    fn zero_max_stay_means_unlimited() {
        let mut p = place();
        p.max_stay = Some(0);
        assert!(request("2026-07-02", "2026-09-02", 1).validate(&p, day(TODAY)).is_ok());
    }

    #[test]
    fn stay_whose_total_cannot_be_stored_is_rejected() {
        let mut p = place();
        p.price_per_night = "9999999999.99".parse().unwrap();
        assert!(request("2026-07-02", "2026-07-03", 1).validate(&p, day(TODAY)).is_err());

        p.price_per_night = BigDecimal::from(1_000_000_000);
        p.max_stay = None;
        let errors = request("2026-07-02", "2026-07-12", 1)
            .validate(&p, day(TODAY))
            .unwrap_err();
        assert_eq!(
            errors.get("checkOut"),
            Some("The total for this stay is too large, choose fewer nights")
        );
        assert!(request("2026-07-02", "2026-07-04", 1).validate(&p, day(TODAY)).is_ok());
    }

    #[test]
    fn errors_display_as_field_message_pairs() {
        let mut errors = ValidationErrors::new();
        errors.add("guests", "too many");
        errors.add("checkIn", "in the past");
        assert_eq!(errors.to_string(), "checkIn: in the past; guests: too many");
    }
}
