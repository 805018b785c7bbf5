use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use snapshow_db::{ContestError, Database};
use snapshow_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use snapshow_types::roles::Role;

use crate::error::ApiError;
use crate::storage::Storage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub storage: Storage,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    let username = req.username.trim();
    if username.len() < 3 || username.len() > 80 {
        return Err(ContestError::Validation("username must be 3-80 characters").into());
    }
    let email = req.email.trim();
    if email.is_empty() || email.len() > 120 || !email.contains('@') {
        return Err(ContestError::Validation("a valid email address is required").into());
    }
    if req.password.len() < 6 {
        return Err(ContestError::Validation("password must be at least 6 characters").into());
    }

    // Admin accounts are seeded out-of-band; the unique email constraint
    // backstops this pre-check.
    let role = req.role.for_registration();
    if state.db.get_user_by_email(email)?.is_some() {
        return Err(ContestError::Conflict("email already registered").into());
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    state.db.create_user(
        &user_id.to_string(),
        username,
        email,
        &password_hash,
        role.as_str(),
    )?;

    let token = create_token(&state.jwt_secret, user_id, username, role)
        .map_err(ContestError::Internal)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            role,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_email(req.email.trim())?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ContestError::Internal(anyhow::anyhow!("stored hash unreadable: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user = user.into_user();
    let token = create_token(&state.jwt_secret, user.id, &user.username, user.role)
        .map_err(ContestError::Internal)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        role: user.role,
        token,
    }))
}

/// Argon2id with a fresh OS-random salt. Also used by the server's
/// admin-seeding path.
pub fn hash_password(password: &str) -> Result<String, ContestError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ContestError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

fn create_token(
    secret: &str,
    user_id: Uuid,
    username: &str,
    role: Role,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
