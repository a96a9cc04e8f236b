//! Toystore kernel library
//!
//! Toy catalogue HTTP API, the toy query engine and its storage adapters.
//! The `toystore` binary is the entry point for running the server.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Upper bound on handling a single request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the full application: routes, sessions, CORS and request tracing.
pub fn app(state: AppState, config: &Config) -> Router {
    let session_layer = session::create_session_layer(
        session::parse_same_site(&config.cookie_same_site),
        config.cookie_secure,
    );

    // Request flow: TraceLayer → timeout → CORS → session → routes
    routes::router()
        .layer(session_layer)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(build_cors_layer(config)),
        )
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::CONTENT_TYPE, header::ACCEPT];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        // Wildcard origins cannot carry the login cookie.
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(headers);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}
