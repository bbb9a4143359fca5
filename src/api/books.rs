//! Book endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{parse_path_id, AuthenticatedUser, ValidatedJson};
use crate::{
    error::{AppResult, Entity},
    models::{book::BookInput, Book},
    AppState,
};

/// List books, sorted by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "catalog",
    responses((status = 200, description = "All books", body = Vec<Book>))
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.services.catalog.list_books().await?))
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "catalog",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let id = parse_path_id(&id, Entity::Book)?;
    Ok(Json(state.services.catalog.get_book(id).await?))
}

/// Add a title to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "catalog",
    security(("auth_token" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Author, category or publisher not found")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(input): ValidatedJson<BookInput>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.create_book(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "catalog",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Stock below the copies on loan"),
        (status = 404, description = "Book or a referenced record not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<BookInput>,
) -> AppResult<Json<Book>> {
    let id = parse_path_id(&id, Entity::Book)?;
    Ok(Json(state.services.catalog.update_book(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "catalog",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Deleted book", body = Book),
        (status = 403, description = "Admin rights required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "A copy is still on loan")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;
    let id = parse_path_id(&id, Entity::Book)?;
    Ok(Json(state.services.catalog.delete_book(id).await?))
}
