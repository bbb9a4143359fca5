//! REST endpoints and the router that mounts them under `/api`

pub mod auth;
pub mod authors;
pub mod books;
pub mod categories;
pub mod customers;
pub mod health;
pub mod lendings;
pub mod openapi;
pub mod publishers;
pub mod returns;
pub mod users;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, Entity},
    models::UserClaims,
    AppState,
};

/// Header carrying the session token, as issued by `POST /api/users` and
/// `POST /api/auth`
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Extractor for the authenticated staff member.
///
/// Reads `x-auth-token`, falling back to `Authorization: Bearer`. A missing
/// token is a 401; a token that does not verify is a 400.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .or_else(|| {
                parts
                    .headers
                    .get(AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
            })
            .ok_or_else(|| AppError::Authentication("No token provided".to_string()))?;

        let claims = state.services.users.verify_token(token.trim())?;
        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body that has been deserialized and passed its `validator` rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let message = rejection.body_text();

                if let Some(field) = message
                    .split("missing field `")
                    .nth(1)
                    .and_then(|s| s.split('`').next())
                {
                    return AppError::Validation(format!("{} is required", field));
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::Validation(
                        "Missing 'Content-Type: application/json' header".to_string(),
                    );
                }

                AppError::Validation(format!("Invalid request body: {}", message))
            })?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Path ids that are not UUIDs cannot name a stored record
pub(crate) fn parse_path_id(raw: &str, entity: Entity) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(entity))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([axum::http::HeaderName::from_static(AUTH_TOKEN_HEADER)]);

    let api = Router::new()
        .route("/health", get(health::health_check))
        // Catalog
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/publishers",
            get(publishers::list_publishers).post(publishers::create_publisher),
        )
        .route(
            "/publishers/:id",
            get(publishers::get_publisher)
                .put(publishers::update_publisher)
                .delete(publishers::delete_publisher),
        )
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Customers
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        // Lending
        .route("/lendings", get(lendings::list_lendings).post(lendings::create_lending))
        .route("/lendings/extend", post(lendings::extend_lending))
        .route(
            "/lendings/:id",
            get(lendings::get_lending).put(lendings::update_lending),
        )
        .route("/returns", post(returns::create_return))
        // Accounts
        .route("/users", post(users::register))
        .route("/users/me", get(users::me))
        .route("/auth", post(auth::login))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
