//! Reservation API endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult, ErrorResponse, FieldErrors},
    models::reservation::{
        CreateReservation, ReplaceReservation, ReservationQuery, ReservationResponse,
        ReturnReservation, UpdateReservation,
    },
};

/// List reservations
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    params(ReservationQuery),
    responses(
        (status = 200, description = "Matching reservations", body = Vec<ReservationResponse>)
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<Vec<ReservationResponse>>> {
    let reservations = state.services.reservations.list(&query).await?;
    Ok(Json(reservations))
}

/// Get reservation by ID
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = ReservationResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ReservationResponse>> {
    let reservation = state.services.reservations.get(id).await?;
    Ok(Json(reservation))
}

/// Reserve a book
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created, book no longer available", body = ReservationResponse),
        (status = 400, description = "Invalid due time or book not available", body = ErrorResponse)
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    let reservation = state.services.reservations.create(&data).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Replace reservation
#[utoipa::path(
    put,
    path = "/reservations/{id}",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body = ReplaceReservation,
    responses(
        (status = 200, description = "Reservation updated", body = ReservationResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn replace_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<ReplaceReservation>,
) -> AppResult<Json<ReservationResponse>> {
    let reservation = state.services.reservations.update(id, &data.into()).await?;
    Ok(Json(reservation))
}

/// Partially update reservation
#[utoipa::path(
    patch,
    path = "/reservations/{id}",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body = UpdateReservation,
    responses(
        (status = 200, description = "Reservation updated", body = ReservationResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn update_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateReservation>,
) -> AppResult<Json<ReservationResponse>> {
    let reservation = state.services.reservations.update(id, &data).await?;
    Ok(Json(reservation))
}

/// Delete reservation; an active one releases its book
#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn delete_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.reservations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return a reserved book
#[utoipa::path(
    post,
    path = "/reservations/{id}/return",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body(content = ReturnReservation, description = "Optional; return time defaults to now"),
    responses(
        (status = 200, description = "Reservation completed, book available again", body = ReservationResponse),
        (status = 400, description = "Malformed body or book already returned", body = ErrorResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn return_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    body: Result<Json<ReturnReservation>, JsonRejection>,
) -> AppResult<Json<ReservationResponse>> {
    let data = return_body(body)?;
    let reservation = state.services.reservations.return_book(id, &data).await?;
    Ok(Json(reservation))
}

/// A request without a JSON body returns now; a body that fails to parse is rejected
fn return_body(body: Result<Json<ReturnReservation>, JsonRejection>) -> AppResult<ReturnReservation> {
    match body {
        Ok(Json(data)) => Ok(data),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(ReturnReservation::default()),
        Err(JsonRejection::JsonDataError(err)) => Err(AppError::InvalidFields(
            FieldErrors::single("return_time", err.body_text()),
        )),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}
