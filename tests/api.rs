//! HTTP tests against the router, backed by the in-memory store

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use library_lending_server::{
    api::create_router,
    clock::SystemClock,
    models::user::{LoginRequest, RegisterUser},
    repository::{MemoryStore, Repository},
    seed::seed_demo_catalog,
    services::Services,
    AppConfig, AppState,
};

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    async fn new() -> Self {
        let config = AppConfig::default();
        let services = Services::new(
            Repository::in_memory(MemoryStore::new()),
            &config,
            Arc::new(SystemClock),
        );
        seed_demo_catalog(&services.catalog).await.unwrap();

        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        };
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    async fn admin_token(&self) -> String {
        let users = &self.state.services.users;
        users
            .create_user(
                RegisterUser {
                    name: "Head Librarian".into(),
                    email: "head@library.test".into(),
                    password: "s3cret-pass".into(),
                },
                true,
            )
            .await
            .unwrap();
        users
            .authenticate(LoginRequest {
                email: "head@library.test".into(),
                password: "s3cret-pass".into(),
            })
            .await
            .unwrap()
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("x-auth-token", token);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, json)
    }

    async fn customer(&self, token: &str, name: &str) -> String {
        let (status, _, body) = self
            .call(
                "POST",
                "/api/customers",
                Some(token),
                Some(json!({ "name": name, "phone": "0611223344" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn book_id(&self, title: &str) -> String {
        let (_, _, books) = self.call("GET", "/api/books", None, None).await;
        books
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["title"] == title)
            .and_then(|b| b["id"].as_str())
            .unwrap()
            .to_string()
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, _, body) = app.call("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_returns_token_header_and_me_works() {
    let app = TestApp::new().await;
    let (status, headers, body) = app
        .call(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "name": "Desk Clerk",
                "email": "clerk@library.test",
                "password": "hunter22"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("passwordHash").is_none());
    let token = headers["x-auth-token"].to_str().unwrap().to_string();

    let (status, _, me) = app.call("GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "clerk@library.test");
    assert_eq!(me["isAdmin"], false);
}

#[tokio::test]
async fn missing_token_is_401_and_bad_token_is_400() {
    let app = TestApp::new().await;
    let body = json!({ "name": "Anonymous", "phone": "0611223344" });

    let (status, _, error) = app
        .call("POST", "/api/customers", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error"], "Authentication");

    let (status, _, _) = app
        .call("POST", "/api/customers", Some("garbage"), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lending_round_trip_over_http() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let customer_id = app.customer(&token, "Isaiah Berlin").await;
    let book_id = app.book_id("Eichmann in Jerusalem").await;
    let pair = json!({ "customerId": customer_id, "bookId": book_id });

    let (status, _, loan) = app
        .call("POST", "/api/lendings", Some(&token), Some(pair.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["customer"]["name"], "Isaiah Berlin");
    assert_eq!(loan["book"]["title"], "Eichmann in Jerusalem");
    assert_eq!(loan["returned"], false);

    let (status, _, book) = app
        .call("GET", &format!("/api/books/{}", book_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["available"], 4);

    let (status, _, error) = app
        .call("POST", "/api/lendings", Some(&token), Some(pair.clone()))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "AlreadyHoldingBook");

    let (status, _, extended) = app
        .call("POST", "/api/lendings/extend", Some(&token), Some(pair.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(extended["id"], loan["id"]);

    let (status, _, returned) = app
        .call("POST", "/api/returns", Some(&token), Some(pair.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["returned"], true);
    assert_eq!(returned["penalty"], 0);

    let (status, _, _) = app
        .call("POST", "/api/returns", Some(&token), Some(pair))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, history) = app.call("GET", "/api/lendings", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (status, _, single) = app
        .call("GET", &format!("/api/lendings/{}", loan["id"].as_str().unwrap()), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(single["returned"], true);
}

#[tokio::test]
async fn malformed_ids() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, _, _) = app.call("GET", "/api/books/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, error) = app
        .call(
            "POST",
            "/api/lendings",
            Some(&token),
            Some(json!({ "customerId": "42", "bookId": "also-bad" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "ValidationFailure");
}

#[tokio::test]
async fn unknown_customer_is_404() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let book_id = app.book_id("Political Theology").await;

    let (status, _, error) = app
        .call(
            "POST",
            "/api/lendings",
            Some(&token),
            Some(json!({ "customerId": uuid::Uuid::new_v4(), "bookId": book_id })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "NotFound");
}

#[tokio::test]
async fn invalid_customer_input_is_400() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, _, error) = app
        .call(
            "POST",
            "/api/customers",
            Some(&token),
            Some(json!({ "name": "Al", "phone": "12ab" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "ValidationFailure");
}

#[tokio::test]
async fn delete_needs_admin() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let customer_id = app.customer(&admin, "Leo Strauss").await;

    let (_, headers, _) = app
        .call(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "name": "Desk Clerk",
                "email": "clerk@library.test",
                "password": "hunter22"
            })),
        )
        .await;
    let clerk = headers["x-auth-token"].to_str().unwrap().to_string();

    let uri = format!("/api/customers/{}", customer_id);
    let (status, _, _) = app.call("DELETE", &uri, Some(&clerk), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, deleted) = app.call("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["name"], "Leo Strauss");

    let (status, _, _) = app.call("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_on_a_lending_extends_or_returns_it() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let customer_id = app.customer(&token, "Judith Shklar").await;
    let book_id = app.book_id("Political Theology").await;

    let (status, _, loan) = app
        .call(
            "POST",
            "/api/lendings",
            Some(&token),
            Some(json!({ "customerId": customer_id, "bookId": book_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/lendings/{}", loan["id"].as_str().unwrap());

    let (status, _, error) = app.call("PUT", &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "ValidationFailure");

    let (status, _, extended) = app
        .call("PUT", &uri, Some(&token), Some(json!({ "hasReturned": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(extended["returned"], false);

    let (status, _, returned) = app
        .call("PUT", &uri, Some(&token), Some(json!({ "hasReturned": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["returned"], true);
    assert_eq!(returned["penalty"], 0);

    let (status, _, error) = app
        .call("PUT", &uri, Some(&token), Some(json!({ "hasReturned": false })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "AlreadyProcessed");

    let unknown = format!("/api/lendings/{}", uuid::Uuid::new_v4());
    let (status, _, _) = app
        .call("PUT", &unknown, Some(&token), Some(json!({ "hasReturned": true })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
