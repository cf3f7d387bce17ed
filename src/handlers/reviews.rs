use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::actor::CurrentActor;
use super::dto::{CreateReviewRequest, ReviewResponse};
use super::{blocking, Service};
use crate::domain::ports::RentalRepository;
use crate::errors::AppError;

/// POST /api/reviews
///
/// Reviews a completed or cancelled stay. Each reservation accepts a single review.
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 400, description = "Rating out of range"),
        (status = 403, description = "Caller is not the guest"),
        (status = 409, description = "Stay still open or already reviewed"),
    ),
    tag = "reviews"
)]
pub async fn create_review<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
    body: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let body = body.into_inner();
    let review = blocking(service, move |s| {
        s.add_review(&actor, body.reservation_id, body.rating, body.comment)
    })
    .await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

/// GET /api/reviews/place/{id}
#[utoipa::path(
    get,
    path = "/api/reviews/place/{id}",
    params(("id" = Uuid, Path, description = "Place UUID")),
    responses(
        (status = 200, description = "Reviews of the place, newest first", body = Vec<ReviewResponse>),
        (status = 404, description = "Place not found"),
    ),
    tag = "reviews"
)]
pub async fn list_place_reviews<R: RentalRepository>(
    service: Service<R>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let place_id = path.into_inner();
    let reviews = blocking(service, move |s| s.place_reviews(place_id)).await?;
    let body: Vec<ReviewResponse> = reviews.into_iter().map(ReviewResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    use crate::handlers::actor::{USER_ID_HEADER, USER_ROLE_HEADER};
    use crate::handlers::configure;
    use crate::handlers::dto::ReviewResponse;
    use crate::handlers::testing::{completed_stay, seed_place, service, GUEST, HOST};
    use crate::infrastructure::memory_repo::InMemoryRentalRepository;

    fn review(reservation_id: uuid::Uuid, rating: i32) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/reviews")
            .insert_header((USER_ID_HEADER, GUEST))
            .set_json(json!({
                "reservationId": reservation_id,
                "rating": rating,
                "comment": "  Lovely view  "
            }))
    }

    #[actix_web::test]
    async fn completed_stay_is_reviewed_once() {
        let data = service();
        let place = seed_place(&data);
        let stay = completed_stay(&data, &place);
        let app = test::init_service(
            App::new()
                .app_data(data.clone())
                .configure(configure::<InMemoryRentalRepository>),
        )
        .await;

        let resp = test::call_service(&app, review(stay.id, 9).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: ReviewResponse = test::read_body_json(resp).await;
        assert_eq!(created.rating, 9);
        assert_eq!(created.comment.as_deref(), Some("Lovely view"));

        let second = test::call_service(&app, review(stay.id, 7).to_request()).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/reviews/place/{}", place.id))
            .to_request();
        let listed: Vec<ReviewResponse> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);
    }

    #[actix_web::test]
    async fn rating_out_of_range_is_rejected() {
        let data = service();
        let place = seed_place(&data);
        let stay = completed_stay(&data, &place);
        let app = test::init_service(
            App::new()
                .app_data(data.clone())
                .configure(configure::<InMemoryRentalRepository>),
        )
        .await;

        let resp = test::call_service(&app, review(stay.id, 11).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["data"]["rating"].is_string());
    }

    #[actix_web::test]
    async fn host_cannot_review_own_place() {
        let data = service();
        let place = seed_place(&data);
        let stay = completed_stay(&data, &place);
        let app = test::init_service(
            App::new()
                .app_data(data.clone())
                .configure(configure::<InMemoryRentalRepository>),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/reviews")
            .insert_header((USER_ID_HEADER, HOST))
            .insert_header((USER_ROLE_HEADER, "HOST"))
            .set_json(json!({ "reservationId": stay.id, "rating": 10 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
