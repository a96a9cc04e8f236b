//! Authentication routes (login, signup, logout).

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{CreateUser, SessionUser, User};
use crate::session::SESSION_USER_ID;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub fullname: String,
}

/// Logout confirmation body.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub msg: &'static str,
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/logout", post(logout))
}

/// Bind the session to `user`, issuing a fresh session id.
async fn start_session(session: &Session, user: &User) -> AppResult<()> {
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to cycle session id: {e}")))?;
    session
        .insert(SESSION_USER_ID, &user.id)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to store session: {e}")))?;
    Ok(())
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<SessionUser>> {
    let Json(request) = payload?;
    let user = state
        .auth()
        .login(&request.username, &request.password)
        .await?;
    start_session(&session, &user).await?;
    Ok(Json(user.to_session_user()))
}

/// POST /api/auth/signup
///
/// Creates a regular account and logs it in.
async fn signup(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<Json<SessionUser>> {
    let Json(request) = payload?;
    let user = state
        .auth()
        .signup(CreateUser {
            username: request.username,
            password: request.password,
            fullname: request.fullname,
            is_admin: false,
        })
        .await?;
    start_session(&session, &user).await?;
    Ok(Json(user.to_session_user()))
}

/// POST /api/auth/logout
async fn logout(session: Session) -> AppResult<Json<LogoutResponse>> {
    let user_id: Option<String> = session.get(SESSION_USER_ID).await.ok().flatten();

    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to clear session: {e}")))?;

    if let Some(user_id) = user_id {
        info!(user_id = %user_id, "user logged out");
    }

    Ok(Json(LogoutResponse {
        msg: "Logged out successfully",
    }))
}
