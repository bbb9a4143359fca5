//! Login endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use super::ValidatedJson;
use crate::{error::AppResult, models::user::LoginRequest, AppState};

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT to send back in the `x-auth-token` header
    pub token: String,
}

/// Exchange email and password for a token
#[utoipa::path(
    post,
    path = "/auth",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let token = state.services.users.authenticate(request).await?;
    Ok(Json(LoginResponse { token }))
}
