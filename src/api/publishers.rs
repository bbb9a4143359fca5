//! Publisher endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{parse_path_id, AuthenticatedUser, ValidatedJson};
use crate::{
    error::{AppResult, Entity},
    models::{publisher::PublisherInput, Publisher},
    AppState,
};

#[utoipa::path(
    get,
    path = "/publishers",
    tag = "catalog",
    responses((status = 200, description = "All publishers", body = Vec<Publisher>))
)]
pub async fn list_publishers(State(state): State<AppState>) -> AppResult<Json<Vec<Publisher>>> {
    Ok(Json(state.services.catalog.list_publishers().await?))
}

#[utoipa::path(
    get,
    path = "/publishers/{id}",
    tag = "catalog",
    params(("id" = String, Path, description = "Publisher ID")),
    responses(
        (status = 200, description = "Publisher", body = Publisher),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn get_publisher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Publisher>> {
    let id = parse_path_id(&id, Entity::Publisher)?;
    Ok(Json(state.services.catalog.get_publisher(id).await?))
}

#[utoipa::path(
    post,
    path = "/publishers",
    tag = "catalog",
    security(("auth_token" = [])),
    request_body = PublisherInput,
    responses(
        (status = 201, description = "Publisher created", body = Publisher),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(input): ValidatedJson<PublisherInput>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    let publisher = state.services.catalog.create_publisher(input).await?;
    Ok((StatusCode::CREATED, Json(publisher)))
}

#[utoipa::path(
    put,
    path = "/publishers/{id}",
    tag = "catalog",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Publisher ID")),
    request_body = PublisherInput,
    responses(
        (status = 200, description = "Publisher updated", body = Publisher),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn update_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<PublisherInput>,
) -> AppResult<Json<Publisher>> {
    let id = parse_path_id(&id, Entity::Publisher)?;
    Ok(Json(state.services.catalog.update_publisher(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/publishers/{id}",
    tag = "catalog",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Publisher ID")),
    responses(
        (status = 200, description = "Deleted publisher", body = Publisher),
        (status = 403, description = "Admin rights required"),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn delete_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Publisher>> {
    claims.require_admin()?;
    let id = parse_path_id(&id, Entity::Publisher)?;
    Ok(Json(state.services.catalog.delete_publisher(id).await?))
}
