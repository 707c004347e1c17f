use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::handlers::ws;
use crate::models::activity::{ActivityQuery, RecordActivityRequest, WellnessActivity};
use crate::models::streak::StreakUpdate;
use crate::services::wellness;
use crate::AppState;

#[derive(Debug, serde::Serialize)]
pub struct RecordActivityResponse {
    pub activity: WellnessActivity,
    pub streak_update: StreakUpdate,
}

/// Direct activity recording for action types with no dedicated endpoint
/// (meditation, gratitude, journal, exercise). Mood logs and hugs also land
/// here indirectly via their own handlers.
pub async fn record_activity(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<RecordActivityRequest>,
) -> AppResult<Json<RecordActivityResponse>> {
    let (activity, streak_update) = wellness::record_activity(
        &state.db,
        auth_user.id,
        body.activity_type,
        body.related_entity_id,
        body.metadata,
    )
    .await?;

    ws::notify_milestone(state.ws_tx.as_ref(), auth_user.id, &streak_update);

    Ok(Json(RecordActivityResponse {
        activity,
        streak_update,
    }))
}

pub async fn list_activities(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<WellnessActivity>>> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);

    let activities = sqlx::query_as::<_, WellnessActivity>(
        r#"
        SELECT * FROM wellness_activities
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(auth_user.id)
    .bind(limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(activities))
}
