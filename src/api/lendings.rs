//! Lending endpoints: checkout, extension and history

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{parse_path_id, AuthenticatedUser, ValidatedJson};
use crate::{
    error::{AppResult, Entity},
    models::{
        loan::{LoanRequest, LoanUpdate},
        Loan,
    },
    AppState,
};

/// List every loan, most recent checkout first
#[utoipa::path(
    get,
    path = "/lendings",
    tag = "lending",
    responses((status = 200, description = "All loans", body = Vec<Loan>))
)]
pub async fn list_lendings(State(state): State<AppState>) -> AppResult<Json<Vec<Loan>>> {
    Ok(Json(state.services.loans.list_loans().await?))
}

#[utoipa::path(
    get,
    path = "/lendings/{id}",
    tag = "lending",
    params(("id" = String, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_lending(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Loan>> {
    let id = parse_path_id(&id, Entity::Loan)?;
    Ok(Json(state.services.loans.get_loan(id).await?))
}

/// Lend a book to a customer
#[utoipa::path(
    post,
    path = "/lendings",
    tag = "lending",
    security(("auth_token" = [])),
    request_body = LoanRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Invalid customerId or bookId"),
        (status = 404, description = "Customer or book not found"),
        (status = 409, description = "Customer already holds a book, or no copy is available")
    )
)]
pub async fn create_lending(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<LoanRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let (customer_id, book_id) = request.ids()?;
    let loan = state.services.loans.create_loan(customer_id, book_id).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Push back the due date of the pair's open loan
#[utoipa::path(
    post,
    path = "/lendings/extend",
    tag = "lending",
    security(("auth_token" = [])),
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Loan extended", body = Loan),
        (status = 400, description = "Invalid customerId or bookId"),
        (status = 404, description = "No loan for this customer and book"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn extend_lending(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<LoanRequest>,
) -> AppResult<Json<Loan>> {
    let (customer_id, book_id) = request.ids()?;
    Ok(Json(state.services.loans.extend_loan(customer_id, book_id).await?))
}

/// Extend a loan by id, or take the book back when `hasReturned` is set
#[utoipa::path(
    put,
    path = "/lendings/{id}",
    tag = "lending",
    security(("auth_token" = [])),
    params(("id" = String, Path, description = "Loan ID")),
    request_body = LoanUpdate,
    responses(
        (status = 200, description = "Loan extended or closed", body = Loan),
        (status = 400, description = "hasReturned is missing"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn update_lending(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<LoanUpdate>,
) -> AppResult<Json<Loan>> {
    let id = parse_path_id(&id, Entity::Loan)?;
    let loans = &state.services.loans;
    let loan = if update.has_returned {
        loans.return_loan_by_id(id).await?
    } else {
        loans.extend_loan_by_id(id).await?
    };
    Ok(Json(loan))
}
