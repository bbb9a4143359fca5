//! Staff account endpoints

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    Json,
};

use super::{AuthenticatedUser, ValidatedJson, AUTH_TOKEN_HEADER};
use crate::{
    error::{AppError, AppResult},
    models::user::{RegisterUser, UserInfo},
    AppState,
};

/// Register a staff account. The session token comes back in `x-auth-token`.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = UserInfo),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterUser>,
) -> AppResult<(StatusCode, HeaderMap, Json<UserInfo>)> {
    let (user, token) = state.services.users.register(request).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTH_TOKEN_HEADER,
        HeaderValue::from_str(&token).map_err(|e| AppError::Internal(e.to_string()))?,
    );
    Ok((StatusCode::CREATED, headers, Json(user)))
}

/// Current user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Authenticated user", body = UserInfo),
        (status = 401, description = "No token provided"),
        (status = 400, description = "Invalid token")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    Ok(Json(state.services.users.get_user(claims.user_id).await?))
}
