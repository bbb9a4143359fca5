//! Author endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{parse_path_id, AuthenticatedUser, ValidatedJson};
use crate::{
    error::{AppResult, Entity},
    models::{author::AuthorInput, Author},
    AppState,
};

/// List authors, sorted by last name
#[utoipa::path(
    get,
    path = "/authors",
    tag = "catalog",
    responses(
        (status = 200, description = "All authors", body = Vec<Author>)
    )
)]
pub async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<Author>>> {
    Ok(Json(state.services.catalog.list_authors().await?))
}

#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "catalog",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Author>> {
    let id = parse_path_id(&id, Entity::Author)?;
    Ok(Json(state.services.catalog.get_author(id).await?))
}

#[utoipa::path(
    post,
    path = "/authors",
    tag = "catalog",
    security(("auth_token" = [])),
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(input): ValidatedJson<AuthorInput>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.services.catalog.create_author(input).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "catalog",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Author ID")),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<AuthorInput>,
) -> AppResult<Json<Author>> {
    let id = parse_path_id(&id, Entity::Author)?;
    Ok(Json(state.services.catalog.update_author(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "catalog",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Deleted author", body = Author),
        (status = 403, description = "Admin rights required"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Author>> {
    claims.require_admin()?;
    let id = parse_path_id(&id, Entity::Author)?;
    Ok(Json(state.services.catalog.delete_author(id).await?))
}
