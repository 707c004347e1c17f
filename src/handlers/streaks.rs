use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::reward::ClaimResult;
use crate::models::streak::{StreakInfoResponse, UserStreak};
use crate::services::wellness;
use crate::AppState;

pub async fn get_streak_info(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<StreakInfoResponse>> {
    let info = wellness::get_streak_info(&state.db, auth_user.id).await?;
    Ok(Json(info))
}

pub async fn claim_reward(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(reward_id): Path<Uuid>,
) -> AppResult<Json<ClaimResult>> {
    let result = wellness::claim_reward(&state.db, auth_user.id, reward_id).await?;
    if result.success {
        tracing::info!(user_id = %auth_user.id, reward_id = %reward_id, "Streak reward claimed");
    }
    Ok(Json(result))
}

/// Administrative reset for a user's streak. Zeroes the current streak and
/// appends a reset marker; the longest streak survives.
pub async fn reset_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserStreak>> {
    if !auth_user.is_admin {
        return Err(AppError::Forbidden);
    }

    let streak = wellness::reset_streak(&state.db, user_id).await?;
    tracing::info!(admin_id = %auth_user.id, user_id = %user_id, "Streak reset by admin");
    Ok(Json(streak))
}
