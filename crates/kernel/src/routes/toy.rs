//! Toy catalogue API.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::models::{LabelCount, Message, MessageAuthor, NewMessage, NewToy, Toy, ToyUpdate};
use crate::query::{ToyListParams, ToyPage};
use crate::routes::helpers::{require_admin, require_login};
use crate::state::AppState;

/// Confirmation body for deletions.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub msg: &'static str,
}

/// Create the toy API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/toy", get(list_toys).post(add_toy).put(update_toy))
        .route("/api/toy/labels", get(list_labels))
        .route("/api/toy/labels/count", get(label_counts))
        .route("/api/toy/{id}", get(get_toy).delete(remove_toy))
        .route("/api/toy/{id}/msg", post(add_message))
        .route("/api/toy/{id}/msg/{msg_id}", delete(remove_message))
}

/// GET /api/toy?filterBy=..&sortBy=..&pageIdx=..
///
/// Taken as raw pairs so a repeated key never rejects the request.
async fn list_toys(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<ToyPage>> {
    let query = ToyListParams::from_pairs(&pairs).to_query();
    Ok(Json(state.toys().query(&query).await?))
}

async fn list_labels(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.toys().labels())
}

async fn label_counts(
    State(state): State<AppState>,
) -> AppResult<Json<BTreeMap<String, LabelCount>>> {
    Ok(Json(state.toys().label_statistics().await?))
}

async fn get_toy(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Toy>> {
    Ok(Json(state.toys().get(&id).await?))
}

async fn add_toy(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<NewToy>, JsonRejection>,
) -> AppResult<Json<Toy>> {
    require_admin(&state, &session).await?;
    let Json(input) = payload?;
    Ok(Json(state.toys().add(input).await?))
}

async fn update_toy(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<ToyUpdate>, JsonRejection>,
) -> AppResult<Json<Toy>> {
    require_admin(&state, &session).await?;
    let Json(update) = payload?;
    Ok(Json(state.toys().update(update).await?))
}

async fn remove_toy(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    require_admin(&state, &session).await?;
    state.toys().remove(&id).await?;
    Ok(Json(DeleteResponse {
        msg: "Deleted successfully",
    }))
}

/// POST /api/toy/{id}/msg
async fn add_message(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> AppResult<Json<Message>> {
    let user = require_login(&state, &session).await?;
    let Json(input) = payload?;
    let by = MessageAuthor {
        id: user.id,
        fullname: user.fullname,
    };
    Ok(Json(state.toys().add_message(&id, input, by).await?))
}

/// DELETE /api/toy/{id}/msg/{msg_id}
async fn remove_message(
    State(state): State<AppState>,
    session: Session,
    Path((id, msg_id)): Path<(String, String)>,
) -> AppResult<Json<String>> {
    require_login(&state, &session).await?;
    Ok(Json(state.toys().remove_message(&id, &msg_id).await?))
}
