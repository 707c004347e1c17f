use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::mood::MoodEntry;
use crate::services::analytics::{generate_mood_analytics, MoodAnalytics};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
    #[serde(default)]
    pub include_correlations: bool,
}

pub async fn get_mood_analytics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<MoodAnalytics>> {
    let days = query.days.unwrap_or(30).clamp(1, 365);
    let since = Utc::now() - Duration::days(days);

    // Oldest-first: the trend computation depends on chronological order.
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(since)
    .fetch_all(&state.db)
    .await?;

    let analytics = generate_mood_analytics(&entries, days, query.include_correlations);
    Ok(Json(analytics))
}
