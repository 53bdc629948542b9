use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::middleware::Caller;
use crate::auth::password;
use crate::dto::{CreateUserRequest, CreateUserResponse, ListUsersResponse, StatusResponse, UserDto};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::User;

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUserResponse>), AppError> {
    let Json(body) = payload?;
    let username = body.username.trim().to_string();
    if username.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }
    if state.users.find_by_username(&username).is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let hash = password::hash_on_pool(body.password).await?;
    let user = User::new(username, hash);
    let id = user.id.clone();

    // The pre-check above can race with a concurrent signup
    if !state.users.insert(user) {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            status: "success",
            message: "User created".to_string(),
            id,
        }),
    ))
}

pub async fn list_users(
    _caller: Caller,
    State(state): State<AppState>,
) -> Json<ListUsersResponse> {
    let users = state.users.list().iter().map(UserDto::from).collect();
    Json(ListUsersResponse { users })
}

pub async fn get_user(
    _caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDto>, AppError> {
    parse_id(&id)?;
    let user = state
        .users
        .get(&id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserDto::from(&user)))
}

/// Deletes a user.
///
/// Users from the config file cannot be deleted through the API. Other
/// users may be deleted by themselves or by a configured user.
pub async fn delete_user(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    parse_id(&id)?;
    let target = state
        .users
        .get(&id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if state.config.is_configured_user(&target.username) {
        return Err(AppError::Forbidden(
            "Configured users cannot be deleted".to_string(),
        ));
    }
    let allowed = match &caller {
        Caller::Anonymous => true,
        Caller::User { id: caller_id, username } => {
            *caller_id == target.id || state.config.is_configured_user(username)
        }
    };
    if !allowed {
        tracing::warn!("{} tried to delete user {}", caller.name(), target.username);
        return Err(AppError::Forbidden(
            "Not allowed to delete this user".to_string(),
        ));
    }

    let deleted = state
        .users
        .delete(&id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    tracing::info!("User {} deleted by {}", deleted.username, caller.name());
    Ok(Json(StatusResponse::success("User deleted")))
}

fn parse_id(id: &str) -> Result<uuid::Uuid, AppError> {
    uuid::Uuid::parse_str(id).map_err(|_| AppError::BadRequest("Invalid ID".to_string()))
}
