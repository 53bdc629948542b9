use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::auth::{jwt, password};
use crate::dto::{LoginRequest, LoginResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(body) = payload?;

    let Some(user) = state.users.find_by_username(&body.username) else {
        tracing::warn!("Failed login attempt for unknown user: {}", body.username);
        return Err(AppError::Auth("Invalid credentials".to_string()));
    };

    if !password::verify_user(&user, body.password).await? {
        tracing::warn!("Failed login attempt for user: {}", user.username);
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let issued = jwt::issue(
        &state.config.auth.jwt_secret,
        state.config.auth.jwt_ttl_hours,
        &user,
    )?;
    tracing::info!("User logged in: {} ({})", user.username, user.id);

    Ok(Json(LoginResponse {
        success: true,
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
