use actix_web::{web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use super::actor::CurrentActor;
use super::dto::{HostStatsResponse, PlaceResponse, ReservationResponse};
use super::{blocking, Service};
use crate::domain::ports::RentalRepository;
use crate::errors::AppError;

/// GET /api/host/places
#[utoipa::path(
    get,
    path = "/api/host/places",
    responses((status = 200, description = "Places owned by the caller", body = Vec<PlaceResponse>)),
    tag = "host"
)]
pub async fn list_places<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let places = blocking(service, move |s| s.host_places(&actor)).await?;
    let body: Vec<PlaceResponse> = places.into_iter().map(PlaceResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/host/places/{id}/reservations
#[utoipa::path(
    get,
    path = "/api/host/places/{id}/reservations",
    params(("id" = Uuid, Path, description = "Place UUID")),
    responses(
        (status = 200, description = "Reservations of the place", body = Vec<ReservationResponse>),
        (status = 403, description = "Caller does not own the place"),
        (status = 404, description = "Place not found"),
    ),
    tag = "host"
)]
pub async fn list_place_reservations<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let place_id = path.into_inner();
    let items = blocking(service, move |s| s.place_reservations(&actor, place_id)).await?;
    let body: Vec<ReservationResponse> =
        items.into_iter().map(ReservationResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/host/stats
///
/// Dashboard figures for the current calendar month (UTC).
#[utoipa::path(
    get,
    path = "/api/host/stats",
    responses(
        (status = 200, description = "Host dashboard numbers", body = HostStatsResponse),
        (status = 403, description = "Host account required"),
    ),
    tag = "host"
)]
pub async fn stats<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let now = Utc::now();
    let stats = blocking(service, move |s| s.host_stats(&actor, now)).await?;
    Ok(HttpResponse::Ok().json(HostStatsResponse::from(stats)))
}
