use actix_web::{web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use super::actor::CurrentActor;
use super::dto::{ApiMessage, CreateReservationRequest, ReservationResponse};
use super::{blocking, Service};
use crate::domain::booking::BookingRequest;
use crate::domain::gate::Actor;
use crate::domain::ports::RentalRepository;
use crate::domain::reservation::{GuestFilter, Reservation};
use crate::errors::AppError;

fn to_responses(items: Vec<Reservation>) -> Vec<ReservationResponse> {
    items.into_iter().map(ReservationResponse::from).collect()
}

async fn guest_list<R: RentalRepository>(
    service: Service<R>,
    actor: Actor,
    filter: GuestFilter,
) -> Result<HttpResponse, AppError> {
    let today = Utc::now().date_naive();
    let items = blocking(service, move |s| s.guest_reservations(&actor, filter, today)).await?;
    Ok(HttpResponse::Ok().json(to_responses(items)))
}

/// GET /api/reservations
///
/// Every reservation the caller made as a guest, newest first.
#[utoipa::path(
    get,
    path = "/api/reservations",
    responses(
        (status = 200, description = "Caller's reservations", body = Vec<ReservationResponse>),
        (status = 401, description = "Missing caller identity"),
    ),
    tag = "reservations"
)]
pub async fn list_my_reservations<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    guest_list(service, actor, GuestFilter::All).await
}

/// GET /api/reservations/upcoming
///
/// Pending or confirmed stays that have not started yet.
#[utoipa::path(
    get,
    path = "/api/reservations/upcoming",
    responses((status = 200, description = "Upcoming stays", body = Vec<ReservationResponse>)),
    tag = "reservations"
)]
pub async fn list_upcoming<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    guest_list(service, actor, GuestFilter::Upcoming).await
}

/// GET /api/reservations/past
#[utoipa::path(
    get,
    path = "/api/reservations/past",
    responses((status = 200, description = "Stays already checked out", body = Vec<ReservationResponse>)),
    tag = "reservations"
)]
pub async fn list_past<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    guest_list(service, actor, GuestFilter::Past).await
}

/// GET /api/reservations/cancelled
#[utoipa::path(
    get,
    path = "/api/reservations/cancelled",
    responses((status = 200, description = "Cancelled reservations", body = Vec<ReservationResponse>)),
    tag = "reservations"
)]
pub async fn list_cancelled<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    guest_list(service, actor, GuestFilter::Cancelled).await
}

/// GET /api/reservations/host
///
/// Reservations made on any place the caller owns.
#[utoipa::path(
    get,
    path = "/api/reservations/host",
    responses((status = 200, description = "Reservations of the caller's places", body = Vec<ReservationResponse>)),
    tag = "reservations"
)]
pub async fn list_host_reservations<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let items = blocking(service, move |s| s.host_reservations(&actor)).await?;
    Ok(HttpResponse::Ok().json(to_responses(items)))
}

/// GET /api/reservations/{id}
#[utoipa::path(
    get,
    path = "/api/reservations/{id}",
    params(("id" = Uuid, Path, description = "Reservation UUID")),
    responses(
        (status = 200, description = "Reservation found", body = ReservationResponse),
        (status = 403, description = "Caller is neither guest, host nor admin"),
        (status = 404, description = "Reservation not found"),
    ),
    tag = "reservations"
)]
pub async fn get_reservation<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let id = path.into_inner();
    let reservation = blocking(service, move |s| s.get_reservation(&actor, id)).await?;
    Ok(HttpResponse::Ok().json(ReservationResponse::from(reservation)))
}

/// POST /api/reservations
///
/// Validates the stay against the place rules, prices it and records it as
/// PENDING. The conflict check, the insert and the outbox event share one
/// transaction.
#[utoipa::path(
    post,
    path = "/api/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ReservationResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Place not found"),
        (status = 409, description = "Dates already booked"),
    ),
    tag = "reservations"
)]
pub async fn create_reservation<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
    body: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let request = BookingRequest::from(body.into_inner());
    let today = Utc::now().date_naive();
    let created = blocking(service, move |s| s.create_reservation(&actor, request, today)).await?;
    Ok(HttpResponse::Created().json(ReservationResponse::from(created)))
}

/// POST /api/reservations/{id}/confirm
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/confirm",
    params(("id" = Uuid, Path, description = "Reservation UUID")),
    responses(
        (status = 200, description = "Reservation confirmed", body = ReservationResponse),
        (status = 403, description = "Only the host can confirm"),
        (status = 409, description = "Reservation is not pending"),
    ),
    tag = "reservations"
)]
pub async fn confirm_reservation<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let id = path.into_inner();
    let updated = blocking(service, move |s| s.confirm_reservation(&actor, id)).await?;
    Ok(HttpResponse::Ok().json(ReservationResponse::from(updated)))
}

/// POST /api/reservations/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/cancel",
    params(("id" = Uuid, Path, description = "Reservation UUID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = ReservationResponse),
        (status = 403, description = "Caller is neither guest nor host"),
        (status = 409, description = "Reservation can no longer be cancelled"),
    ),
    tag = "reservations"
)]
pub async fn cancel_reservation<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let id = path.into_inner();
    let updated = blocking(service, move |s| s.cancel_reservation(&actor, id)).await?;
    Ok(HttpResponse::Ok().json(ReservationResponse::from(updated)))
}

/// DELETE /api/reservations/{id}
#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    params(("id" = Uuid, Path, description = "Reservation UUID")),
    responses(
        (status = 200, description = "Reservation deleted", body = ApiMessage),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Reservation not found"),
    ),
    tag = "reservations"
)]
pub async fn delete_reservation<R: RentalRepository>(
    service: Service<R>,
    caller: CurrentActor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = caller.0;
    let id = path.into_inner();
    blocking(service, move |s| s.delete_reservation(&actor, id)).await?;
    Ok(HttpResponse::Ok().json(ApiMessage::ok("Reservation deleted")))
}
