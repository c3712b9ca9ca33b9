//! Auth API Handlers

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{Json, extract::State};
use serde::Serialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{LoginRequest, Role, UserCreate, UserPublic};
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::{AppError, AppResult};

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<AuthResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?
        .to_string();

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create(
            payload.name,
            payload.email,
            password_hash,
            payload.role.unwrap_or(Role::Customer),
        )
        .await?;

    let user_id = user.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&user_id, &user.name, user.role.as_str())
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        user: UserPublic::from(&user),
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::forbidden("Account is inactive"));
    }

    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::internal(format!("Corrupt password hash: {e}")))?;
    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed)
        .is_err()
    {
        security_log!("WARN", "login_failed", email = payload.email.clone());
        return Err(AppError::invalid_credentials());
    }

    let user_id = user.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    repo.touch_last_login(&user_id).await?;

    let token = state
        .jwt_service
        .generate_token(&user_id, &user.name, user.role.as_str())
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        user: UserPublic::from(&user),
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UserPublic>> {
    let repo = UserRepository::new(state.db.clone());
    let record = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", user.id)))?;
    Ok(Json(UserPublic::from(&record)))
}
