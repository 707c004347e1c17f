use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per logged user action. Rows are append-only: never updated or
/// deleted in normal operation, so streak state can always be recomputed
/// from this log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WellnessActivity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: ActivityType,
    pub related_entity_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub streak_points: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "activity_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    MoodLog,
    HugSent,
    HugReceived,
    Meditation,
    Gratitude,
    Journal,
    Exercise,
}

impl ActivityType {
    /// Fixed per-type point values.
    pub fn streak_points(self) -> f64 {
        match self {
            ActivityType::MoodLog => 1.0,
            ActivityType::HugSent => 1.0,
            ActivityType::HugReceived => 0.5,
            ActivityType::Meditation => 2.0,
            ActivityType::Gratitude => 1.5,
            ActivityType::Journal => 1.5,
            ActivityType::Exercise => 2.0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordActivityRequest {
    pub activity_type: ActivityType,
    pub related_entity_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}
