use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::api::extract::JsonBody;
use crate::auth::AdminUser;
use crate::catalog::{CatalogFilter, CatalogQuery};
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::{Book, BookInput};

#[utoipa::path(
    get,
    path = "/api/books",
    params(
        ("search" = Option<String>, Query, description = "Substring of title, author, description or ISBN"),
        ("filter" = Option<String>, Query, description = "newArrivals or newInMarket"),
        ("categories" = Option<String>, Query, description = "Comma separated category ids"),
        ("minPrice" = Option<f64>, Query, description = "Inclusive lower price bound"),
        ("maxPrice" = Option<f64>, Query, description = "Inclusive upper price bound")
    ),
    responses(
        (status = 200, description = "Matching books, newest first")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<Book>>, DomainError> {
    let filter = CatalogFilter::from(query);
    tracing::debug!("Catalog query: {:?}", filter);

    Ok(Json(state.book_repo.find_all(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book with its categories"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Book>, DomainError> {
    state
        .book_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| DomainError::not_found("Book"))
}

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book created"),
        (status = 400, description = "Invalid book"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<(StatusCode, Json<Book>), DomainError> {
    let book = state.book_repo.create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

#[utoipa::path(
    post,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book updated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<Json<Book>, DomainError> {
    Ok(Json(state.book_repo.update(id, input).await?))
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/delete",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    state.book_repo.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
