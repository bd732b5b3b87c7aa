//! Auth API Handlers

use axum::extract::State;
use axum::Json;

use crate::auth::{hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::user as user_repo;
use crate::utils::{AppError, AppResult};
use shared::models::{Role, SignInRequest, SignUpRequest, TokenResponse, UserResponse};

/// POST /auth/signup - self-service registration, always a plain user
pub async fn sign_up(
    State(state): State<ServerState>,
    Json(payload): Json<SignUpRequest>,
) -> AppResult<Json<UserResponse>> {
    if payload.username.trim().is_empty() || payload.password.len() < 4 {
        return Err(AppError::Validation(
            "Username and a password of at least 4 characters are required".into(),
        ));
    }
    if user_repo::exists_by_username(state.db.pool(), &payload.username).await? {
        return Err(AppError::Conflict(format!(
            "Username {} already exists",
            payload.username
        )));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = user_repo::create(
        state.db.pool(),
        &payload.username,
        &password_hash,
        &[Role::User],
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User signed up");
    Ok(Json(user.into()))
}

/// POST /auth/signin - verify credentials and issue a token.
/// Failures are deliberately indistinguishable: no username enumeration.
pub async fn sign_in(
    State(state): State<ServerState>,
    Json(payload): Json<SignInRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = user_repo::find_by_username(state.db.pool(), &payload.username)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::invalid_credentials());
    }

    let access_token = state
        .jwt
        .generate_token(&user)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "User signed in");
    Ok(Json(TokenResponse { access_token }))
}
