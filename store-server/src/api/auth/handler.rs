//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation_message;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserCreate, UserRole};
use crate::db::repository::{RepoError, UserRepository};
use crate::security_log;
use shared::{AppError, AppResult, ErrorCode};

/// Fixed delay applied to every login attempt so response timing does
/// not reveal whether the email exists
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// 注册响应
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

/// Register a customer account
///
/// Accounts created through the public API are always plain customers;
/// admin accounts are provisioned out of band.
pub async fn register(
    State(state): State<ServerState>,
    Json(mut payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    payload
        .validate()
        .map_err(|e| AppError::validation(validation_message(&e)))?;

    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(payload, UserRole::User)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::EmailTaken),
            other => other.into(),
        })?;

    tracing::info!(email = %user.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Login with email and password
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = payload.email.trim().to_lowercase();

    let repo = UserRepository::new(state.get_db());
    let user = repo.find_by_email(&email).await?;

    // Fixed delay before inspecting the lookup result. A miss and a
    // bad password must take the same time.
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(user) => user,
        None => {
            tracing::warn!(email = %email, "Login failed - user not found");
            security_log!(WARN, "login_failed", email = %email, reason = "unknown account");
            return Err(AppError::invalid_credentials());
        }
    };

    let password_ok = user
        .verify_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_ok {
        tracing::warn!(email = %email, "Login failed - invalid password");
        security_log!(WARN, "login_failed", email = %email, reason = "bad password");
        return Err(AppError::invalid_credentials());
    }

    let user_id = user
        .id
        .as_ref()
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::internal("User record has no id"))?;

    let token = state
        .get_jwt_service()
        .generate_token(&user_id, &user.email, user.role.as_str())
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %user_id, email = %user.email, "User logged in");

    Ok(Json(LoginResponse { token, user }))
}

/// Current authenticated user
pub async fn me(State(state): State<ServerState>, current: CurrentUser) -> AppResult<Json<User>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(user))
}
