use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::gate::{Actor, UserRole};
use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Caller identity forwarded by the authenticating gateway.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, AppError> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or(AppError::Unauthorized)?;

    let role = match headers.get(USER_ROLE_HEADER) {
        None => UserRole::Guest,
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<UserRole>().ok())
            .ok_or(AppError::Unauthorized)?,
    };

    Ok(Actor::new(user_id, role))
}

impl FromRequest for CurrentActor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = actor_from_headers(req.headers()).map(CurrentActor);
        if result.is_err() {
            log::debug!("Rejected request to {} without caller identity", req.path());
        }
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn extract(req: TestRequest) -> Result<CurrentActor, AppError> {
        let req = req.to_http_request();
        actor_from_headers(req.headers()).map(CurrentActor)
    }

    #[test]
    fn role_defaults_to_guest() {
        let id = Uuid::new_v4();
        let CurrentActor(actor) =
            extract(TestRequest::default().insert_header((USER_ID_HEADER, id.to_string())))
                .expect("actor");
        assert_eq!(actor.user_id, id);
        assert_eq!(actor.role, UserRole::Guest);
    }

    #[test]
    fn role_header_is_case_insensitive() {
        let CurrentActor(actor) = extract(
            TestRequest::default()
                .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
                .insert_header((USER_ROLE_HEADER, "host")),
        )
        .expect("actor");
        assert_eq!(actor.role, UserRole::Host);
    }

    #[test]
    fn missing_user_id_is_unauthorized() {
        let err = extract(TestRequest::default()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn malformed_identity_is_unauthorized() {
        let bad_id = extract(TestRequest::default().insert_header((USER_ID_HEADER, "42")));
        assert!(matches!(bad_id, Err(AppError::Unauthorized)));

        let bad_role = extract(
            TestRequest::default()
                .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
                .insert_header((USER_ROLE_HEADER, "ROOT")),
        );
        assert!(matches!(bad_role, Err(AppError::Unauthorized)));
    }
}
