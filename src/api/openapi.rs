//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, categories, health, reservations, reviews};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Management API",
        version = "1.0.0",
        description = "Books, categories, reviews and reservations REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::replace_book,
        books::update_book,
        books::delete_book,
        books::add_book_category,
        books::remove_book_category,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::replace_category,
        categories::update_category,
        categories::delete_category,
        // Reviews
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::replace_review,
        reviews::update_review,
        reviews::delete_review,
        // Reservations
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::create_reservation,
        reservations::replace_reservation,
        reservations::update_reservation,
        reservations::delete_reservation,
        reservations::return_reservation,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookQuery,
            // Categories
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            // Reviews
            crate::models::review::Review,
            crate::models::review::CreateReview,
            crate::models::review::UpdateReview,
            crate::models::review::ReviewQuery,
            // Reservations
            crate::models::reservation::ReservationStatus,
            crate::models::reservation::ReservationResponse,
            crate::models::reservation::CreateReservation,
            crate::models::reservation::ReplaceReservation,
            crate::models::reservation::UpdateReservation,
            crate::models::reservation::ReturnReservation,
            crate::models::reservation::ReservationQuery,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "categories", description = "Book categories"),
        (name = "reviews", description = "Book reviews"),
        (name = "reservations", description = "Reservation lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
