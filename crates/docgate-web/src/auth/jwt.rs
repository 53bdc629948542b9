//! HS256 session tokens for stored users.
//!
//! `sub` carries the user's document id so a token keeps pointing at the
//! same record even if another user later registers the same name.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::store::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

/// A freshly signed token and its expiry (unix seconds).
#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

pub fn issue(jwt_secret: &str, ttl_hours: u64, user: &User) -> anyhow::Result<IssuedToken> {
    let issued_at = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let expires_at = ttl_hours
        .checked_mul(3600)
        .and_then(|ttl| issued_at.checked_add(ttl))
        .ok_or_else(|| anyhow::anyhow!("token lifetime of {ttl_hours}h is out of range"))?;

    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        iat: issued_at,
        exp: expires_at,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )?;

    Ok(IssuedToken { token, expires_at })
}

/// Checks signature and expiry and returns the claims.
pub fn verify(jwt_secret: &str, token: &str) -> anyhow::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn alice() -> User {
        User::new("alice".to_string(), "hash".to_string())
    }

    #[test]
    fn token_identifies_user_by_id() {
        let user = alice();
        let issued = issue(SECRET, 1, &user).unwrap();
        let claims = verify(SECRET, &issued.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp, issued.expires_at);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn wrong_secret_rejected() {
        let issued = issue(SECRET, 1, &alice()).unwrap();
        assert!(verify("another-secret-another-secret-xx", &issued.token).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let claims = Claims {
            sub: "id".to_string(),
            username: "alice".to_string(),
            iat: 0,
            exp: 1,
            jti: "x".to_string(),
        };
        let old = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(verify(SECRET, &old).is_err());
    }

    #[test]
    fn huge_lifetime_is_an_error() {
        let err = issue(SECRET, u64::MAX, &alice()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
