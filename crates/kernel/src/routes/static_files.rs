//! Static frontend serving.
//!
//! Any GET that no API route claims is answered from the static directory.
//! Paths without a matching file get `index.html` so client-side routes load.

use std::path::Path;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Response, StatusCode, Uri, header};
use axum::response::IntoResponse;
use tokio::fs;
use tracing::warn;

use crate::error::ErrorBody;
use crate::state::AppState;

const INDEX_FILE: &str = "index.html";

/// Router fallback: serve a static file or the frontend entry point.
pub async fn serve_frontend(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Response<Body> {
    let path = uri.path().trim_start_matches('/');

    if path == "api" || path.starts_with("api/") || (method != Method::GET && method != Method::HEAD)
    {
        return api_not_found();
    }

    // Security: prevent path traversal
    if path.contains("..") || path.contains('\0') {
        return not_found();
    }

    let static_dir = state.static_dir();
    if !path.is_empty()
        && let Some(response) = read_file(&static_dir.join(path)).await
    {
        return response;
    }

    match read_file(&static_dir.join(INDEX_FILE)).await {
        Some(response) => response,
        None => not_found(),
    }
}

async fn read_file(file_path: &Path) -> Option<Response<Body>> {
    let content = match fs::read(file_path).await {
        Ok(content) => content,
        Err(e) => {
            if !matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory
            ) {
                warn!(path = %file_path.display(), error = %e, "failed to read static file");
            }
            return None;
        }
    };

    Some(
        (
            [
                (header::CONTENT_TYPE, mime_from_path(file_path)),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            content,
        )
            .into_response(),
    )
}

fn api_not_found() -> Response<Body> {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            err: "not found".to_string(),
        }),
    )
        .into_response()
}

fn not_found() -> Response<Body> {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn mime_from_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js") | Some("mjs") => "application/javascript",
        Some("css") => "text/css",
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
