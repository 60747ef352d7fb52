use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::UserId;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub exp: usize,
}

/// The signed-in user behind a request. Used as an extractor on handlers that need a session;
/// it rejects with 401 otherwise.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: String,
}

/// Issue a session token valid for `config.session_ttl_secs`.
pub fn generate_session_token(
    user_id: &Uuid,
    username: &str,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::seconds(config.session_ttl_secs as i64)).timestamp() as usize;
    let claims = Claims {
        user_id: user_id.to_string(),
        username: username.to_string(),
        exp,
    };

    let header = Header::new(Algorithm::HS256);
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_ref());
    encode(&header, &claims, &encoding_key)
}

pub fn decode_session_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let decoding_key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &decoding_key, &validation).map(|data| data.claims)
}

/// Session cookie first, then `Authorization: Bearer`.
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
}

/// Resolve the session attached to a request, if any. An absent, expired or forged token is
/// `Ok(None)`; only a failing user lookup is an error.
pub async fn resolve_auth_user(state: &AppState, headers: &HeaderMap) -> Result<Option<AuthUser>, ApiError> {
    let token = match extract_token(headers, &state.config.session_cookie_name) {
        Some(t) => t,
        None => return Ok(None),
    };

    let claims = match decode_session_token(&token, &state.config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("Session token rejected: {:?}", e);
            return Ok(None);
        }
    };

    let user_id = match Uuid::parse_str(&claims.user_id) {
        Ok(u) => u,
        Err(_) => return Ok(None),
    };

    // The account may have been removed since the token was issued.
    let user = state.stores.users.find_by_id(user_id).await?;
    Ok(user.map(|u| AuthUser {
        user_id: u.id,
        username: u.username,
    }))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_auth_user(state, &parts.headers)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Authentication required or session invalid"))
    }
}
