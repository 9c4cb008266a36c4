use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            Identity, LoginRequest, LoginResponse, ProfileResponse, ProtectedResponse,
            RegisterRequest, RegisterResponse,
        },
        extractors::AuthUser,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
        .route("/auth/protected", get(protected))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    payload.validate()?;
    let res = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;
    Ok(Json(state.auth.login(payload).await?))
}

#[instrument(skip(claims), fields(user_id = claims.sub))]
pub async fn profile(AuthUser(claims): AuthUser) -> Json<ProfileResponse<Identity>> {
    Json(ProfileResponse {
        message: "profile retrieved successfully".into(),
        user: Identity {
            user_id: claims.sub,
            email: claims.email,
            display_name: claims.name,
            username: claims.username,
        },
    })
}

#[instrument(skip(claims), fields(user_id = claims.sub))]
pub async fn protected(AuthUser(claims): AuthUser) -> Result<Json<ProtectedResponse>, AppError> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(anyhow::Error::from)?;
    Ok(Json(ProtectedResponse {
        message: format!("Hello {}. This is a protected route.", claims.name),
        timestamp,
        user_id: claims.sub,
    }))
}
