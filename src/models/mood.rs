use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: String,
    pub intensity: i32,
    pub note: Option<String>,
    pub is_public: bool,
    pub activities: serde_json::Value,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodRequest {
    #[validate(length(min = 1, max = 64, message = "Mood label is required"))]
    pub mood: String,
    #[validate(range(min = 1, max = 10, message = "Intensity must be between 1 and 10"))]
    pub intensity: i32,
    pub note: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub activities: Option<Vec<String>>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
