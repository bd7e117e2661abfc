//! Password hashing, signed session tokens and the request extractors that
//! resolve them back into a user.
//!
//! A token is only accepted while the `sessions` row it names exists, so
//! logging out (deleting the row) revokes it before `exp`.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Session};
use crate::infrastructure::AppState;
use crate::models::user::{self, ROLE_ADMIN};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub sid: String, // sessions.id
    pub role: String,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DomainError::Internal(e.to_string()))?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, DomainError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| DomainError::Internal(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn create_session_token(
    session: &Session,
    role: &str,
    secret: &str,
) -> Result<String, DomainError> {
    let claims = Claims {
        sub: session.user_id.to_string(),
        sid: session.id.clone(),
        role: role.to_owned(),
        exp: session.expires_at.timestamp().max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| DomainError::Internal(e.to_string()))
}

pub fn decode_session_token(token: &str, secret: &str) -> Result<Claims, DomainError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| DomainError::Unauthorized("Invalid or expired session".to_string()))
}

/// Creates the session row and its signed token. Expired rows are purged
/// on the way.
pub async fn start_session(
    state: &AppState,
    user: &user::Model,
) -> Result<(Session, String), DomainError> {
    match state.session_repo.purge_expired().await {
        Ok(0) => {}
        Ok(purged) => tracing::debug!("Purged {} expired sessions", purged),
        Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
    }

    let session = state
        .session_repo
        .create(user.id, state.config.session_ttl)
        .await?;
    let token = create_session_token(&session, &user.role, &state.config.session_secret)?;
    Ok((session, token))
}

/// Token from `Authorization: Bearer ...`, falling back to the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        && let Some(token) = value.strip_prefix("Bearer ")
        && !token.trim().is_empty()
    {
        return Some(token.trim().to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str, max_age: chrono::Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age.num_seconds().max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", chrono::Duration::zero(), secure)
}

/// A request made with a live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: String,
    pub session_id: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = session_token(&parts.headers)
            .ok_or_else(|| DomainError::Unauthorized("Authentication required".to_string()))?;
        let claims = decode_session_token(&token, &state.config.session_secret)?;

        let session = state
            .session_repo
            .find_active(&claims.sid)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Session has ended".to_string()))?;

        if claims.sub != session.user_id.to_string() || session.expires_at <= Utc::now() {
            return Err(DomainError::Unauthorized(
                "Invalid or expired session".to_string(),
            ));
        }

        // Role comes from the database so a demotion takes effect immediately
        let user = user::Entity::find_by_id(session.user_id)
            .one(state.db())
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Account no longer exists".to_string()))?;

        Ok(AuthUser {
            user_id: user.id,
            role: user.role,
            session_id: session.id,
        })
    }
}

/// A request made by an administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(DomainError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(verify_password("s3cret!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn reads_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc.def.ghi; lang=he"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=cookie"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("header"));
    }

    #[test]
    fn empty_cookie_is_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn token_carries_session_id() {
        let session = Session {
            id: "sid-1".to_string(),
            user_id: 42,
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        let token = create_session_token(&session, "user", "test-secret").unwrap();
        let claims = decode_session_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.sid, "sid-1");
        assert!(decode_session_token(&token, "other-secret").is_err());
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok", chrono::Duration::hours(1), true);
        assert!(cookie.starts_with("session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }
}
