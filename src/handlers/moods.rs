use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::ws;
use crate::models::activity::ActivityType;
use crate::models::mood::{CreateMoodRequest, MoodEntry, MoodQuery};
use crate::models::streak::StreakUpdate;
use crate::services::wellness;
use crate::AppState;

#[derive(Debug, serde::Serialize)]
pub struct CreateMoodResponse {
    #[serde(flatten)]
    pub entry: MoodEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_update: Option<StreakUpdate>,
}

pub async fn create_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodRequest>,
) -> AppResult<Json<CreateMoodResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let activities = body
        .activities
        .map(|a| serde_json::json!(a))
        .unwrap_or_else(|| serde_json::json!([]));

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood, intensity, note, is_public, activities, location)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.mood)
    .bind(body.intensity)
    .bind(&body.note)
    .bind(body.is_public)
    .bind(&activities)
    .bind(&body.location)
    .fetch_one(&state.db)
    .await?;

    // Streak bookkeeping is best-effort: a failure here must not reject the
    // mood save. It self-corrects on the next recomputation.
    let streak_update = match wellness::record_activity(
        &state.db,
        auth_user.id,
        ActivityType::MoodLog,
        Some(entry.id),
        None,
    )
    .await
    {
        Ok((_, update)) => Some(update),
        Err(e) => {
            tracing::warn!(user_id = %auth_user.id, error = %e, "Streak update failed after mood save");
            None
        }
    };

    if let Some(update) = &streak_update {
        ws::notify_milestone(state.ws_tx.as_ref(), auth_user.id, update);
    }

    Ok(Json(CreateMoodResponse {
        entry,
        streak_update,
    }))
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND created_at::date BETWEEN $2 AND $3
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}
