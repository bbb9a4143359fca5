//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{parse_path_id, AuthenticatedUser, ValidatedJson};
use crate::{
    error::{AppResult, Entity},
    models::{category::CategoryInput, Category},
    AppState,
};

#[utoipa::path(
    get,
    path = "/categories",
    tag = "catalog",
    responses((status = 200, description = "All categories", body = Vec<Category>))
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.services.catalog.list_categories().await?))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "catalog",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let id = parse_path_id(&id, Entity::Category)?;
    Ok(Json(state.services.catalog.get_category(id).await?))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "catalog",
    security(("auth_token" = [])),
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(input): ValidatedJson<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = state.services.catalog.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "catalog",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Category ID")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<CategoryInput>,
) -> AppResult<Json<Category>> {
    let id = parse_path_id(&id, Entity::Category)?;
    Ok(Json(state.services.catalog.update_category(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "catalog",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted category", body = Category),
        (status = 403, description = "Admin rights required"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    claims.require_admin()?;
    let id = parse_path_id(&id, Entity::Category)?;
    Ok(Json(state.services.catalog.delete_category(id).await?))
}
