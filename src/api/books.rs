//! Book API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppResult, ErrorResponse},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

/// List books with filters and ordering
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 400, description = "Unknown ordering", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list(&query).await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Create book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid fields", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.create(&data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = CreateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn replace_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<CreateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.replace(id, data).await?;
    Ok(Json(book))
}

/// Partially update book
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.update(id, &data).await?;
    Ok(Json(book))
}

/// Delete book with its reviews and reservations
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Link a category to a book by name
#[utoipa::path(
    post,
    path = "/books/{id}/categories/{name}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID"),
        ("name" = String, Path, description = "Category name")
    ),
    responses(
        (status = 201, description = "Category linked", body = Book),
        (status = 404, description = "Book or category not found", body = ErrorResponse)
    )
)]
pub async fn add_book_category(
    State(state): State<crate::AppState>,
    Path((id, name)): Path<(i32, String)>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.add_category(id, &name).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Unlink a category from a book by name
#[utoipa::path(
    delete,
    path = "/books/{id}/categories/{name}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID"),
        ("name" = String, Path, description = "Category name")
    ),
    responses(
        (status = 204, description = "Category unlinked"),
        (status = 404, description = "Book or category not found", body = ErrorResponse)
    )
)]
pub async fn remove_book_category(
    State(state): State<crate::AppState>,
    Path((id, name)): Path<(i32, String)>,
) -> AppResult<StatusCode> {
    state.services.books.remove_category(id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}
