#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Every [`TestApp`] drives the REAL router and services over a
//! `JsonFileStore` in its own temporary data directory, so tests run in
//! parallel without external services.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use toystore_kernel::models::CreateUser;
use toystore_kernel::{AppState, Config};
use toystore_test_utils::{TestToy, write_toy_file};

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub data_dir: TempDir,
}

impl TestApp {
    /// Start with an empty catalogue.
    pub async fn new() -> Self {
        Self::with_toys(&[]).await
    }

    /// Start with `toys` already in the data file.
    pub async fn with_toys(toys: &[TestToy]) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create data dir");
        if !toys.is_empty() {
            write_toy_file(data_dir.path(), toys).expect("Failed to seed toy file");
        }

        let mut config = Config::for_data_dir(data_dir.path());
        config.static_dir = data_dir.path().join("public");

        let state = AppState::new(&config)
            .await
            .expect("Failed to initialize AppState");
        let router = toystore_kernel::app(state.clone(), &config);

        Self {
            router,
            state,
            data_dir,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request with cookies from a previous response.
    pub async fn request_with_cookies(
        &self,
        mut request: Request<Body>,
        cookies: &str,
    ) -> Response {
        if !cookies.is_empty() {
            request.headers_mut().insert(
                header::COOKIE,
                cookies.parse().expect("Invalid cookie header"),
            );
        }
        self.request(request).await
    }

    /// GET a path and return status and JSON body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .request(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// Send a JSON body with the given method and session cookies.
    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        body: Value,
        cookies: &str,
    ) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request_with_cookies(request, cookies).await
    }

    /// Send a raw body labelled as JSON, for bodies that do not parse.
    pub async fn send_raw_json(
        &self,
        method: &str,
        uri: &str,
        body: &str,
        cookies: &str,
    ) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request_with_cookies(request, cookies).await
    }

    /// Login via the JSON API and return the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the login response is not 200 OK.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .send_json(
                "POST",
                "/api/auth/login",
                json!({ "username": username, "password": password }),
                "",
            )
            .await;

        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Login failed for user '{username}' (status {})",
            response.status()
        );

        extract_cookies(&response)
    }

    /// Create a regular user and return session cookies after logging in.
    pub async fn create_and_login_user(&self, username: &str, password: &str) -> String {
        self.state
            .auth()
            .signup(create_user(username, password))
            .await
            .expect("Failed to create test user");
        self.login(username, password).await
    }

    /// Create an admin and return session cookies after logging in.
    pub async fn create_and_login_admin(&self, username: &str, password: &str) -> String {
        self.state
            .auth()
            .create_admin(create_user(username, password))
            .await
            .expect("Failed to create test admin");
        self.login(username, password).await
    }
}

fn create_user(username: &str, password: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        password: password.to_string(),
        fullname: format!("{username} Tester"),
        is_admin: false,
    }
}

/// Read a response body as JSON (`Value::Null` for an empty body).
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// Extract Set-Cookie headers from a response for use in subsequent requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| {
            // Extract just the cookie name=value, ignoring attributes
            cookie.split(';').next()
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build a toy list URI with JSON-encoded `filterBy` / `sortBy` parameters.
pub fn toy_list_uri(
    filter_by: Option<&Value>,
    sort_by: Option<&Value>,
    page_idx: Option<&str>,
) -> String {
    let mut params = Vec::new();
    if let Some(filter) = filter_by {
        params.push(format!("filterBy={}", urlencoding::encode(&filter.to_string())));
    }
    if let Some(sort) = sort_by {
        params.push(format!("sortBy={}", urlencoding::encode(&sort.to_string())));
    }
    if let Some(page) = page_idx {
        params.push(format!("pageIdx={}", urlencoding::encode(page)));
    }

    if params.is_empty() {
        "/api/toy".to_string()
    } else {
        format!("/api/toy?{}", params.join("&"))
    }
}
