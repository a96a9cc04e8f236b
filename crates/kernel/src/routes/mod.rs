//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod helpers;
pub mod static_files;
pub mod toy;

use axum::Router;

use crate::state::AppState;

/// All API routes, with the static frontend as fallback.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(toy::router())
        .merge(auth::router())
        .merge(health::router())
        .fallback(static_files::serve_frontend)
}
