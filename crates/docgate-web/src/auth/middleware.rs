use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Caller of a user route.
///
/// With no users configured every caller is [`Caller::Anonymous`];
/// otherwise a valid `Authorization: Bearer` token is required.
#[derive(Debug)]
pub enum Caller {
    Anonymous,
    User { id: String, username: String },
}

impl Caller {
    pub fn name(&self) -> &str {
        match self {
            Caller::Anonymous => "anonymous",
            Caller::User { username, .. } => username,
        }
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.has_auth() {
            return Ok(Caller::Anonymous);
        }

        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

        let claims = super::jwt::verify(&state.config.auth.jwt_secret, token)
            .map_err(|_| AppError::Auth("Invalid or expired token".to_string()))?;

        // Tokens of deleted users stop working immediately
        if state.users.get(&claims.sub).is_none() {
            return Err(AppError::Auth("Unknown user".to_string()));
        }

        Ok(Caller::User {
            id: claims.sub,
            username: claims.username,
        })
    }
}
