//! Login sessions kept in process memory.
//!
//! The session id travels in the `loginToken` cookie. The session itself only
//! records which user is logged in; the user is re-read from the store on
//! every guarded request.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE_NAME: &str = "loginToken";

/// Session key for the authenticated user id.
pub const SESSION_USER_ID: &str = "user_id";

/// Default session expiry (24 hours of inactivity).
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;

/// Create the session layer backed by an in-memory store.
pub fn create_session_layer(same_site: SameSite, secure: bool) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(secure)
        .with_http_only(true)
        .with_same_site(same_site)
        .with_path("/")
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            DEFAULT_SESSION_EXPIRY_HOURS,
        )))
}

/// Map a configured policy name onto a cookie SameSite value. Unknown names fall back to lax.
pub fn parse_same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}
