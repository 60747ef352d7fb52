use axum::{extract::State, http::StatusCode, response::Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, StoreError};
use crate::middleware::auth::{generate_session_token, AuthUser};
use crate::models::{User, UserProfile};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

pub const MIN_PASSWORD_LEN: usize = 8;

pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::internal(format!("hashing task failed: {}", e)))?
        .map_err(|e| {
            tracing::error!("Error hashing password: {:?}", e);
            ApiError::internal("Failed to create account")
        })
}

async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("verification task failed: {}", e)))?
        .map_err(|e| {
            tracing::error!("Error verifying password: {:?}", e);
            ApiError::internal("Authentication error")
        })
}

/// Issue a token for `user` and attach it as the session cookie.
fn sign_in(state: &AppState, jar: CookieJar, user: &User) -> Result<(CookieJar, AuthResponse), ApiError> {
    let token = generate_session_token(&user.id, &user.username, &state.config).map_err(|e| {
        tracing::error!("Error generating session token: {:?}", e);
        ApiError::internal("Failed to generate token")
    })?;

    let cookie = Cookie::build((state.config.session_cookie_name.clone(), token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        AuthResponse {
            token,
            user: UserProfile::from(user),
        },
    ))
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = hash_password(payload.password, state.config.bcrypt_cost).await?;
    let user = match state.stores.users.create_user(username, &password_hash).await {
        Ok(u) => u,
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::Conflict("This username is already taken".to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!("New account {} ({})", user.username, user.id);

    let (jar, body) = sign_in(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, Json(body)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }

    let declined = || ApiError::unauthorized("Invalid username or password");

    let user = match state.stores.users.find_by_username(payload.username.trim()).await? {
        Some(u) => u,
        None => {
            tracing::info!("Login failed: unknown user {}", payload.username.trim());
            return Err(declined());
        }
    };

    if !verify_password(payload.password, user.password_hash.clone()).await? {
        tracing::info!("Login failed: wrong password for {}", user.username);
        return Err(declined());
    }

    tracing::info!("{} signed in", user.username);
    let (jar, body) = sign_in(&state, jar, &user)?;
    Ok((StatusCode::OK, jar, Json(body)))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let jar = jar.remove(Cookie::build((state.config.session_cookie_name.clone(), "")).path("/"));
    (StatusCode::NO_CONTENT, jar)
}

/// `GET /api/auth/session`: who is signed in.
pub async fn current_session(user: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "user_id": user.user_id.to_string(),
        "username": user.username,
    }))
}
