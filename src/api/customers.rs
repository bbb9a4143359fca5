//! Customer endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{parse_path_id, AuthenticatedUser, ValidatedJson};
use crate::{
    error::{AppResult, Entity},
    models::{customer::CustomerInput, Customer},
    AppState,
};

#[utoipa::path(
    get,
    path = "/customers",
    tag = "customers",
    responses((status = 200, description = "All customers, by name", body = Vec<Customer>))
)]
pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<Customer>>> {
    Ok(Json(state.services.customers.list_customers().await?))
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Customer>> {
    let id = parse_path_id(&id, Entity::Customer)?;
    Ok(Json(state.services.customers.get_customer(id).await?))
}

#[utoipa::path(
    post,
    path = "/customers",
    tag = "customers",
    security(("auth_token" = [])),
    request_body = CustomerInput,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(input): ValidatedJson<CustomerInput>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let customer = state.services.customers.create_customer(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "customers",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Customer ID")),
    request_body = CustomerInput,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn update_customer(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<CustomerInput>,
) -> AppResult<Json<Customer>> {
    let id = parse_path_id(&id, Entity::Customer)?;
    Ok(Json(state.services.customers.update_customer(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "customers",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Deleted customer", body = Customer),
        (status = 403, description = "Admin rights required"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Customer still holds a book")
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Customer>> {
    claims.require_admin()?;
    let id = parse_path_id(&id, Entity::Customer)?;
    Ok(Json(state.services.customers.delete_customer(id).await?))
}
