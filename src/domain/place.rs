use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::pricing::fits_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceType {
    Apartment,
    House,
    Room,
    Villa,
    Studio,
    Loft,
}

impl PlaceType {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceType::Apartment => "APARTMENT",
            PlaceType::House => "HOUSE",
            PlaceType::Room => "ROOM",
            PlaceType::Villa => "VILLA",
            PlaceType::Studio => "STUDIO",
            PlaceType::Loft => "LOFT",
        }
    }

    /// Human readable name shown on listing cards.
    pub fn label(self) -> &'static str {
        match self {
            PlaceType::Apartment => "Apartment",
            PlaceType::House => "House",
            PlaceType::Room => "Room",
            PlaceType::Villa => "Villa",
            PlaceType::Studio => "Studio",
            PlaceType::Loft => "Loft",
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APARTMENT" => Ok(PlaceType::Apartment),
            "HOUSE" => Ok(PlaceType::House),
            "ROOM" => Ok(PlaceType::Room),
            "VILLA" => Ok(PlaceType::Villa),
            "STUDIO" => Ok(PlaceType::Studio),
            "LOFT" => Ok(PlaceType::Loft),
            other => Err(DomainError::InvalidInput(format!("unknown place type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceStatus {
    Draft,
    Active,
    Inactive,
}

impl PlaceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceStatus::Draft => "DRAFT",
            PlaceStatus::Active => "ACTIVE",
            PlaceStatus::Inactive => "INACTIVE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaceStatus::Draft => "Draft",
            PlaceStatus::Active => "Active",
            PlaceStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for PlaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(PlaceStatus::Draft),
            "ACTIVE" => Ok(PlaceStatus::Active),
            "INACTIVE" => Ok(PlaceStatus::Inactive),
            other => Err(DomainError::InvalidInput(format!("unknown place status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Place {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub place_type: PlaceType,
    pub status: PlaceStatus,
    pub price_per_night: BigDecimal,
    pub cleaning_fee: BigDecimal,
    pub max_guests: i32,
    pub min_stay: Option<i32>,
    pub max_stay: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Place {
    pub fn is_bookable(&self) -> bool {
        self.status == PlaceStatus::Active
    }
}

#[derive(Debug, Clone)]
pub struct NewPlace {
    pub name: String,
    pub place_type: PlaceType,
    pub status: PlaceStatus,
    pub price_per_night: BigDecimal,
    pub cleaning_fee: BigDecimal,
    pub max_guests: i32,
    pub min_stay: Option<i32>,
    pub max_stay: Option<i32>,
}

impl NewPlace {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("name must not be empty".into()));
        }
        if self.price_per_night <= BigDecimal::from(0) {
            return Err(DomainError::InvalidInput("pricePerNight must be positive".into()));
        }
        if !fits_amount(&self.price_per_night) {
            return Err(DomainError::InvalidInput(
                "pricePerNight must have at most 2 decimals and 10 integer digits".into(),
            ));
        }
        if self.cleaning_fee < BigDecimal::from(0) {
            return Err(DomainError::InvalidInput("cleaningFee must not be negative".into()));
        }
        if !fits_amount(&self.cleaning_fee) {
            return Err(DomainError::InvalidInput(
                "cleaningFee must have at most 2 decimals and 10 integer digits".into(),
            ));
        }
        if self.max_guests < 1 {
            return Err(DomainError::InvalidInput("maxGuests must be at least 1".into()));
        }
        if let (Some(min), Some(max)) = (self.min_stay, self.max_stay) {
            if max > 0 && min > max {
                return Err(DomainError::InvalidInput("minStay exceeds maxStay".into()));
            }
        }
        Ok(())
    }
}
