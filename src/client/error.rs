use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::booking::ValidationErrors;

pub const FALLBACK_MESSAGE: &str = "An error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401. The session has already been cleared.
    #[error("session expired")]
    SessionExpired,

    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// Rejected locally before anything was sent.
    #[error("{}", describe_fields(.0.iter()))]
    Validation(ValidationErrors),

    #[error("{0} is already in progress")]
    AlreadyInFlight(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// True when the caller has to sign in again before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<BTreeMap<String, serde_json::Value>>,
}

/// Human label for a request field named in a validation payload.
pub fn field_label(field: &str) -> &str {
    match field {
        "name" => "Name",
        "description" => "Description",
        "cityId" => "City",
        "address" => "Address",
        "type" => "Type",
        "pricePerNight" => "Price per night",
        "cleaningFee" => "Cleaning fee",
        "maxGuests" => "Maximum guests",
        "minStay" => "Minimum stay",
        "maxStay" => "Maximum stay",
        "bedrooms" => "Bedrooms",
        "bathrooms" => "Bathrooms",
        "checkIn" => "Check-in",
        "checkOut" => "Check-out",
        "guests" => "Guests",
        "rating" => "Rating",
        "comment" => "Comment",
        other => other,
    }
}

fn describe_fields<'a>(fields: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    fields
        .map(|(field, message)| format!("{}: {}", field_label(field), message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns an error response body into a single displayable message.
pub fn normalize_error_body(body: &[u8]) -> String {
    let Ok(payload) = serde_json::from_slice::<ErrorPayload>(body) else {
        return FALLBACK_MESSAGE.to_string();
    };

    if let Some(data) = payload.data {
        let messages: Vec<(String, String)> = data
            .into_iter()
            .map(|(field, value)| {
                let message = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (field, message)
            })
            .collect();
        let joined = describe_fields(messages.iter().map(|(f, m)| (f.as_str(), m.as_str())));
        if !joined.is_empty() {
            return joined;
        }
    }

    payload
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_become_labelled_lines() {
        let body = br#"{"success":false,"message":"Validation failed","data":{"pricePerNight":"must be positive","maxGuests":"must be at least 1"}}"#;
        assert_eq!(
            normalize_error_body(body),
            "Maximum guests: must be at least 1\nPrice per night: must be positive"
        );
    }

    #[test]
    fn unknown_fields_keep_their_name() {
        let body = br#"{"data":{"wifi":"unsupported"}}"#;
        assert_eq!(normalize_error_body(body), "wifi: unsupported");
    }

    #[test]
    fn message_is_used_without_data() {
        let body = br#"{"success":false,"message":"Place not found"}"#;
        assert_eq!(normalize_error_body(body), "Place not found");
    }

    #[test]
    fn empty_data_falls_back_to_message() {
        let body = br#"{"message":"Conflict","data":{}}"#;
        assert_eq!(normalize_error_body(body), "Conflict");
    }

    #[test]
    fn unreadable_body_gets_generic_message() {
        assert_eq!(normalize_error_body(b"<html>502</html>"), FALLBACK_MESSAGE);
        assert_eq!(normalize_error_body(b"{}"), FALLBACK_MESSAGE);
        assert_eq!(normalize_error_body(b""), FALLBACK_MESSAGE);
    }

    #[test]
    fn local_validation_uses_the_same_labels() {
        let mut errors = ValidationErrors::new();
        errors.add("guests", "This place accepts at most 2 guests");
        let err = ApiError::Validation(errors);
        assert_eq!(err.to_string(), "Guests: This place accepts at most 2 guests");
        assert!(!err.requires_login());
    }

    #[test]
    fn only_session_expiry_requires_login() {
        assert!(ApiError::SessionExpired.requires_login());
        assert_eq!(ApiError::SessionExpired.to_string(), "session expired");
        let conflict = ApiError::Api {
            status: StatusCode::CONFLICT,
            message: "taken".into(),
        };
        assert!(!conflict.requires_login());
        assert_eq!(conflict.status(), Some(StatusCode::CONFLICT));
    }
}
