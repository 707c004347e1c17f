use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A granted milestone reward. Uniqueness on
/// `(user_id, milestone, reward_type, reward_id)` is enforced by the
/// database and is what makes reward materialization idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StreakReward {
    pub id: Uuid,
    pub user_id: Uuid,
    pub milestone: i32,
    pub reward_type: RewardType,
    pub reward_id: String,
    pub reward_name: String,
    pub reward_description: String,
    pub reward_value: Option<f64>,
    pub is_claimed: bool,
    pub claimed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "reward_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    Badge,
    Points,
    HugType,
    Theme,
    AvatarItem,
}

/// Claim outcome, returned as a body rather than an HTTP error so callers
/// can distinguish "no such reward" from transport failures.
#[derive(Debug, Serialize)]
pub struct ClaimResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<StreakReward>,
}
