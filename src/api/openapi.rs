//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, authors, books, categories, customers, health, lendings, publishers, returns, users,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Lending API",
        version = "1.0.0",
        description = "Catalog, customers and book lending REST API"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        // Catalog
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        publishers::list_publishers,
        publishers::get_publisher,
        publishers::create_publisher,
        publishers::update_publisher,
        publishers::delete_publisher,
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Customers
        customers::list_customers,
        customers::get_customer,
        customers::create_customer,
        customers::update_customer,
        customers::delete_customer,
        // Lending
        lendings::list_lendings,
        lendings::get_lending,
        lendings::create_lending,
        lendings::extend_lending,
        lendings::update_lending,
        returns::create_return,
        // Accounts
        users::register,
        users::me,
        auth::login,
    ),
    components(
        schemas(
            // Catalog
            crate::models::Author,
            crate::models::AuthorSnapshot,
            crate::models::author::AuthorInput,
            crate::models::Category,
            crate::models::category::CategoryInput,
            crate::models::Publisher,
            crate::models::publisher::PublisherInput,
            crate::models::Book,
            crate::models::book::BookInput,
            // Customers
            crate::models::Customer,
            crate::models::customer::CustomerInput,
            // Lending
            crate::models::Loan,
            crate::models::CustomerSnapshot,
            crate::models::BookSnapshot,
            crate::models::loan::LoanRequest,
            crate::models::loan::LoanUpdate,
            // Accounts
            crate::models::user::UserInfo,
            crate::models::user::RegisterUser,
            crate::models::user::LoginRequest,
            auth::LoginResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&TokenHeader),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Authors, categories, publishers and books"),
        (name = "customers", description = "Customer management"),
        (name = "lending", description = "Loans, extensions and returns"),
        (name = "users", description = "Staff accounts"),
        (name = "auth", description = "Authentication endpoints")
    )
)]
pub struct ApiDoc;

struct TokenHeader;

impl Modify for TokenHeader {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "auth_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-auth-token"))),
            )
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
