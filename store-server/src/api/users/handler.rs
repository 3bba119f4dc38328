//! User Profile Handlers
//!
//! Every route here operates on the authenticated user; there is no
//! admin user management surface, accounts are self-service.

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::api::{MessageResponse, validation_message};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserUpdate};
use crate::db::repository::{RepoError, UserRepository};
use shared::{AppError, AppResult, ErrorCode};

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

/// 修改密码请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Get the current user's profile
pub async fn get_profile(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<User>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(user))
}

/// Update the current user's profile
pub async fn update_profile(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(mut payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    payload
        .validate()
        .map_err(|e| AppError::validation(validation_message(&e)))?;

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .update_profile(&current.id, payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::EmailTaken),
            RepoError::NotFound(_) => AppError::new(ErrorCode::UserNotFound),
            other => other.into(),
        })?;

    tracing::info!(user_id = %current.id, "Profile updated");

    Ok(Json(user))
}

/// Change the current user's password
///
/// The current password must be presented again; a stolen token alone
/// is not enough to lock the owner out.
pub async fn change_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let current_ok = user
        .verify_password(&payload.current_password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !current_ok {
        tracing::warn!(user_id = %current.id, "Password change rejected - wrong current password");
        return Err(AppError::new(ErrorCode::CurrentPasswordIncorrect));
    }

    let hash = User::hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

    repo.update_password(&current.id, hash)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::UserNotFound),
            other => other.into(),
        })?;

    tracing::info!(user_id = %current.id, "Password changed");

    Ok(Json(MessageResponse::new("Password updated successfully")))
}
