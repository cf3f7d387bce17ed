use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::actor::CurrentActor;
use super::dto::{CreatePlaceRequest, PlaceResponse};
use super::{blocking, Service};
use crate::domain::place::NewPlace;
use crate::domain::ports::RentalRepository;
use crate::errors::AppError;

/// POST /api/places
///
/// Lists a new place owned by the calling host.
#[utoipa::path(
    post,
    path = "/api/places",
    request_body = CreatePlaceRequest,
    responses(
        (status = 201, description = "Place created", body = PlaceResponse),
        (status = 400, description = "Invalid place"),
        (status = 401, description = "Missing caller identity"),
        (status = 403, description = "Caller is not a host"),
    ),
    tag = "places"
)]
pub async fn create_place<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
    body: web::Json<CreatePlaceRequest>,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let place = NewPlace::from(body.into_inner());
    let created = blocking(service, move |s| s.create_place(&actor, place)).await?;
    Ok(HttpResponse::Created().json(PlaceResponse::from(created)))
}

/// GET /api/places/{id}
#[utoipa::path(
    get,
    path = "/api/places/{id}",
    params(("id" = Uuid, Path, description = "Place UUID")),
    responses(
        (status = 200, description = "Place found", body = PlaceResponse),
        (status = 404, description = "Place not found"),
    ),
    tag = "places"
)]
pub async fn get_place<R: RentalRepository>(
    service: Service<R>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let place = blocking(service, move |s| s.get_place(id)).await?;
    Ok(HttpResponse::Ok().json(PlaceResponse::from(place)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    use crate::handlers::actor::{USER_ID_HEADER, USER_ROLE_HEADER};
    use crate::handlers::testing::{service, HOST};
    use crate::handlers::{configure, dto::PlaceResponse};
    use crate::infrastructure::memory_repo::InMemoryRentalRepository;

    fn place_body() -> serde_json::Value {
        json!({
            "name": "Loft by the river",
            "type": "LOFT",
            "pricePerNight": "120.00",
            "cleaningFee": "30",
            "maxGuests": 2,
            "minStay": 2
        })
    }

    #[actix_web::test]
    async fn host_creates_and_reads_a_place() {
        let app = test::init_service(
            App::new()
                .app_data(service())
                .configure(configure::<InMemoryRentalRepository>),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/places")
            .insert_header((USER_ID_HEADER, HOST))
            .insert_header((USER_ROLE_HEADER, "HOST"))
            .set_json(place_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: PlaceResponse = test::read_body_json(resp).await;
        assert_eq!(created.type_label, "Loft");
        assert_eq!(created.min_stay, Some(2));

        let req = test::TestRequest::get()
            .uri(&format!("/api/places/{}", created.id))
            .to_request();
        let fetched: PlaceResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched.name, "Loft by the river");
        assert_eq!(fetched.owner_id.to_string(), HOST);
    }

    #[actix_web::test]
    async fn guest_cannot_create_a_place() {
        let app = test::init_service(
            App::new()
                .app_data(service())
                .configure(configure::<InMemoryRentalRepository>),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/places")
            .insert_header((USER_ID_HEADER, HOST))
            .set_json(place_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn sub_cent_price_is_a_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(service())
                .configure(configure::<InMemoryRentalRepository>),
        )
        .await;

        let mut body = place_body();
        body["pricePerNight"] = json!("0.001");
        let req = test::TestRequest::post()
            .uri("/api/places")
            .insert_header((USER_ID_HEADER, HOST))
            .insert_header((USER_ROLE_HEADER, "HOST"))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn unknown_place_is_404() {
        let app = test::init_service(
            App::new()
                .app_data(service())
                .configure(configure::<InMemoryRentalRepository>),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/places/{}", uuid::Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Place not found");
        assert_eq!(body["success"], false);
    }
}
