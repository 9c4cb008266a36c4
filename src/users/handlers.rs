use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{MessageResponse, UpdateUserRequest},
    repo_types::PublicUser,
};
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/me",
            get(get_me).patch(update_me).delete(deactivate_me),
        )
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state, _auth))]
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<Vec<PublicUser>> {
    Json(state.auth.list_users().await)
}

#[instrument(skip(state, _auth))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(state.auth.get_profile(id).await?))
}

#[instrument(skip(state, claims), fields(user_id = claims.sub))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(state.auth.get_profile(claims.sub).await?))
}

#[instrument(skip(state, claims, payload), fields(user_id = claims.sub))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(state.auth.update_account(claims.sub, payload).await?))
}

#[instrument(skip(state, claims), fields(user_id = claims.sub))]
pub async fn deactivate_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.deactivate_account(claims.sub).await?;
    Ok(Json(MessageResponse {
        message: format!("user {} deactivated", claims.sub),
    }))
}
