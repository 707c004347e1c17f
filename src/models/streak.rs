use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::reward::StreakReward;

/// Per-user streak aggregate, upserted after every wellness activity.
/// Invariant: `longest_streak >= current_streak` after any update.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserStreak {
    pub user_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub last_streak_update_date: Option<DateTime<Utc>>,
    pub total_mood_entries: i64,
    pub total_hugs_sent: i64,
    pub total_hugs_received: i64,
    pub streak_history: serde_json::Value,
    pub streak_points: f64,
    pub last_reset_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry in the append-only `streak_history` list. Reset markers carry
/// `reset: true` and a zero streak.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakHistoryEntry {
    pub date: NaiveDate,
    pub streak: i32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reset: bool,
}

/// Result of recomputing the current streak from the activity log.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrentStreak {
    pub count: i32,
    pub last_activity: Option<DateTime<Utc>>,
    pub needs_activity: bool,
    pub active_today: bool,
}

/// What the streak bookkeeping produced for a single recorded activity.
#[derive(Debug, Serialize)]
pub struct StreakUpdate {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub streak_increased: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_reached: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rewards_granted: Vec<StreakReward>,
}

#[derive(Debug, Serialize)]
pub struct StreakInfoResponse {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub streak_points: f64,
    pub needs_activity: bool,
    pub active_today: bool,
    pub total_mood_entries: i64,
    pub total_hugs_sent: i64,
    pub total_hugs_received: i64,
    pub pending_rewards: Vec<StreakReward>,
}
