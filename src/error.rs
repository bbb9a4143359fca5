//! Error types for the lending server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Record kinds that can be reported as missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Author,
    Category,
    Publisher,
    Customer,
    Book,
    Loan,
    User,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Entity::Author => "author",
            Entity::Category => "category",
            Entity::Publisher => "publisher",
            Entity::Customer => "customer",
            Entity::Book => "book",
            Entity::Loan => "loan",
            Entity::User => "user",
        };
        f.write_str(name)
    }
}

/// Business-rule conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictKind {
    #[error("customer already holds a book; return it first")]
    AlreadyHoldingBook,

    #[error("no copies of this book are available")]
    NoAvailableCopies,

    #[error("loan has already been returned")]
    AlreadyProcessed,

    #[error("record is referenced by an open loan")]
    HasOpenLoan,

    #[error("a record with the same key already exists")]
    Duplicate,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("No {0} with the given id was found")]
    NotFound(Entity),

    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "Authentication",
            AppError::Authorization(_) => "Authorization",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(ConflictKind::AlreadyHoldingBook) => "AlreadyHoldingBook",
            AppError::Conflict(ConflictKind::NoAvailableCopies) => "NoAvailableCopies",
            AppError::Conflict(ConflictKind::AlreadyProcessed) => "AlreadyProcessed",
            AppError::Conflict(ConflictKind::HasOpenLoan) => "HasOpenLoan",
            AppError::Conflict(ConflictKind::Duplicate) => "Duplicate",
            AppError::Validation(_) => "ValidationFailure",
            AppError::Database(_) => "Database",
            AppError::Internal(_) => "Internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(_) | AppError::Conflict(_) => self.to_string(),
        };

        let body = Json(ErrorResponse {
            error: self.kind().to_string(),
            message,
        });

        (self.status_code(), body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect::<Vec<_>>()
            .join(", ");
        AppError::Validation(message)
    }
}

/// A token that fails to decode or verify is a bad request, not a missing login
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        AppError::Validation(format!("Invalid token: {}", error))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_class() {
        assert_eq!(AppError::NotFound(Entity::Loan).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Conflict(ConflictKind::NoAvailableCopies).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Validation("bad id".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Authentication("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(
            AppError::NotFound(Entity::Customer).to_string(),
            "No customer with the given id was found"
        );
    }

    #[test]
    fn conflict_messages() {
        assert_eq!(
            AppError::Conflict(ConflictKind::AlreadyProcessed).to_string(),
            "Conflict: loan has already been returned"
        );
        assert_eq!(
            ConflictKind::AlreadyHoldingBook.to_string(),
            "customer already holds a book; return it first"
        );
    }
}
