//! Review API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppResult, ErrorResponse},
    models::review::{CreateReview, Review, ReviewQuery, UpdateReview},
};

/// List reviews, newest first
#[utoipa::path(
    get,
    path = "/reviews",
    tag = "reviews",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Matching reviews", body = Vec<Review>)
    )
)]
pub async fn list_reviews(
    State(state): State<crate::AppState>,
    Query(query): Query<ReviewQuery>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = state.services.reviews.list(&query).await?;
    Ok(Json(reviews))
}

/// Get review by ID
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = "reviews",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review details", body = Review),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
pub async fn get_review(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Review>> {
    let review = state.services.reviews.get(id).await?;
    Ok(Json(review))
}

/// Create review
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "reviews",
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid fields or duplicate review", body = ErrorResponse)
    )
)]
pub async fn create_review(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.services.reviews.create(&data).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Replace review
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = "reviews",
    params(("id" = i32, Path, description = "Review ID")),
    request_body = CreateReview,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 400, description = "Invalid fields or duplicate review", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
pub async fn replace_review(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<CreateReview>,
) -> AppResult<Json<Review>> {
    let review = state.services.reviews.replace(id, data).await?;
    Ok(Json(review))
}

/// Partially update review
#[utoipa::path(
    patch,
    path = "/reviews/{id}",
    tag = "reviews",
    params(("id" = i32, Path, description = "Review ID")),
    request_body = UpdateReview,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 400, description = "Invalid fields or duplicate review", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
pub async fn update_review(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateReview>,
) -> AppResult<Json<Review>> {
    let review = state.services.reviews.update(id, &data).await?;
    Ok(Json(review))
}

/// Delete review
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "reviews",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
pub async fn delete_review(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.reviews.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
