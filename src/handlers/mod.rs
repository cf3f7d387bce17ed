pub mod actor;
pub mod dto;
pub mod host;
pub mod places;
pub mod reservations;
pub mod reviews;

use actix_web::web;
use utoipa::OpenApi;

use crate::application::reservation_service::ReservationService;
use crate::domain::errors::DomainError;
use crate::domain::ports::RentalRepository;
use crate::errors::AppError;

pub type Service<R> = web::Data<ReservationService<R>>;

/// Runs a synchronous service call on the blocking thread pool.
pub(crate) async fn blocking<R, T, F>(service: Service<R>, f: F) -> Result<T, AppError>
where
    R: RentalRepository,
    T: Send + 'static,
    F: FnOnce(&ReservationService<R>) -> Result<T, DomainError> + Send + 'static,
{
    let result = web::block(move || f(service.get_ref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(result)
}

/// Registers every route under `/api`.
pub fn configure<R: RentalRepository>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .service(
                web::scope("/places")
                    .route("", web::post().to(places::create_place::<R>))
                    .route("/{id}", web::get().to(places::get_place::<R>)),
            )
            .service(
                web::scope("/reservations")
                    .route("", web::get().to(reservations::list_my_reservations::<R>))
                    .route("", web::post().to(reservations::create_reservation::<R>))
                    .route("/upcoming", web::get().to(reservations::list_upcoming::<R>))
                    .route("/past", web::get().to(reservations::list_past::<R>))
                    .route("/cancelled", web::get().to(reservations::list_cancelled::<R>))
                    .route("/host", web::get().to(reservations::list_host_reservations::<R>))
                    .route("/{id}", web::get().to(reservations::get_reservation::<R>))
                    .route("/{id}", web::delete().to(reservations::delete_reservation::<R>))
                    .route(
                        "/{id}/confirm",
                        web::post().to(reservations::confirm_reservation::<R>),
                    )
                    .route(
                        "/{id}/cancel",
                        web::post().to(reservations::cancel_reservation::<R>),
                    ),
            )
            .service(
                web::scope("/reviews")
                    .route("", web::post().to(reviews::create_review::<R>))
                    .route("/place/{id}", web::get().to(reviews::list_place_reviews::<R>)),
            )
            .service(
                web::scope("/host")
                    .route("/places", web::get().to(host::list_places::<R>))
                    .route(
                        "/places/{id}/reservations",
                        web::get().to(host::list_place_reservations::<R>),
                    )
                    .route("/stats", web::get().to(host::stats::<R>)),
            ),
    );
}

#[derive(OpenApi)]
#[openapi(
    paths(
        places::create_place,
        places::get_place,
        reservations::list_my_reservations,
        reservations::list_upcoming,
        reservations::list_past,
        reservations::list_cancelled,
        reservations::list_host_reservations,
        reservations::get_reservation,
        reservations::create_reservation,
        reservations::confirm_reservation,
        reservations::cancel_reservation,
        reservations::delete_reservation,
        reviews::create_review,
        reviews::list_place_reviews,
        host::list_places,
        host::list_place_reservations,
        host::stats,
    ),
    components(schemas(
        dto::CreatePlaceRequest,
        dto::PlaceResponse,
        dto::CreateReservationRequest,
        dto::ReservationResponse,
        dto::CreateReviewRequest,
        dto::ReviewResponse,
        dto::HostStatsResponse,
        dto::ApiMessage,
        crate::domain::place::PlaceType,
        crate::domain::place::PlaceStatus,
        crate::domain::reservation::ReservationStatus,
    )),
    tags(
        (name = "places", description = "Rental listings"),
        (name = "reservations", description = "Booking lifecycle"),
        (name = "reviews", description = "Guest reviews"),
        (name = "host", description = "Host dashboard"),
    )
)]
pub struct ApiDoc;
