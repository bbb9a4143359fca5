//! Return endpoint

use axum::{extract::State, Json};

use super::{AuthenticatedUser, ValidatedJson};
use crate::{
    error::AppResult,
    models::{loan::LoanRequest, Loan},
    AppState,
};

/// Take a book back, charging a penalty for each full day past the due date
#[utoipa::path(
    post,
    path = "/returns",
    tag = "lending",
    security(("auth_token" = [])),
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Loan closed, penalty set", body = Loan),
        (status = 400, description = "Invalid customerId or bookId"),
        (status = 404, description = "No loan for this customer and book"),
        (status = 409, description = "Return already processed")
    )
)]
pub async fn create_return(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<LoanRequest>,
) -> AppResult<Json<Loan>> {
    let (customer_id, book_id) = request.ids()?;
    Ok(Json(state.services.loans.return_loan(customer_id, book_id).await?))
}
