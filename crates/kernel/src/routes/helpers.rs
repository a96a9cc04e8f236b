//! Shared route guards.

use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::session::SESSION_USER_ID;
use crate::state::AppState;

/// Require an authenticated user.
///
/// Returns the [`User`] if one is logged in, or [`AppError::Unauthorized`] if
/// the session holds no user id or the user no longer exists.
pub async fn require_login(state: &AppState, session: &Session) -> AppResult<User> {
    let user_id: Option<String> = session.get(SESSION_USER_ID).await.ok().flatten();

    if let Some(id) = user_id
        && let Some(user) = state.auth().find_by_id(&id).await?
    {
        return Ok(user);
    }

    Err(AppError::Unauthorized)
}

/// Require an authenticated **admin** user.
///
/// 401 without a valid session, 403 if the user is not an admin.
pub async fn require_admin(state: &AppState, session: &Session) -> AppResult<User> {
    let user = require_login(state, session).await?;
    if !user.is_admin {
        tracing::warn!(user_id = %user.id, "non-admin attempted an admin action");
        return Err(AppError::Forbidden);
    }
    Ok(user)
}
