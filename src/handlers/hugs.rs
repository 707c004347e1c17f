use axum::{extract::State, Extension, Json};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::ws;
use crate::models::activity::ActivityType;
use crate::models::hug::{Hug, SendHugRequest};
use crate::models::streak::StreakUpdate;
use crate::services::wellness;
use crate::AppState;

#[derive(Debug, serde::Serialize)]
pub struct SendHugResponse {
    #[serde(flatten)]
    pub hug: Hug,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_update: Option<StreakUpdate>,
}

pub async fn send_hug(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SendHugRequest>,
) -> AppResult<Json<SendHugResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if body.recipient_id == auth_user.id {
        return Err(AppError::Validation("Cannot send a hug to yourself".into()));
    }

    let recipient_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = $1")
            .bind(body.recipient_id)
            .fetch_one(&state.db)
            .await?;
    if recipient_exists == 0 {
        return Err(AppError::NotFound("Recipient not found".into()));
    }

    let hug = sqlx::query_as::<_, Hug>(
        r#"
        INSERT INTO hugs (id, sender_id, recipient_id, hug_type, message)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.recipient_id)
    .bind(body.hug_type.as_deref().unwrap_or("standard"))
    .bind(&body.message)
    .fetch_one(&state.db)
    .await?;

    // Both sides get a wellness activity; neither failure rejects the hug.
    let streak_update = match wellness::record_activity(
        &state.db,
        auth_user.id,
        ActivityType::HugSent,
        Some(hug.id),
        None,
    )
    .await
    {
        Ok((_, update)) => Some(update),
        Err(e) => {
            tracing::warn!(user_id = %auth_user.id, error = %e, "Streak update failed after hug send");
            None
        }
    };

    match wellness::record_activity(
        &state.db,
        body.recipient_id,
        ActivityType::HugReceived,
        Some(hug.id),
        None,
    )
    .await
    {
        // The recipient's milestone goes to the recipient, not the sender.
        Ok((_, update)) => {
            ws::notify_milestone(state.ws_tx.as_ref(), body.recipient_id, &update)
        }
        Err(e) => {
            tracing::warn!(user_id = %body.recipient_id, error = %e, "Streak update failed for hug recipient");
        }
    }

    // Best-effort delivery; dropped silently when the recipient is offline.
    if let Some(tx) = state.ws_tx.as_ref() {
        let msg = serde_json::json!({
            "type": "hug_received",
            "user_id": body.recipient_id,
            "hug_id": hug.id,
            "sender_id": auth_user.id,
            "hug_type": hug.hug_type,
            "message": hug.message,
        });
        let _ = tx.send(msg.to_string());
    }

    if let Some(update) = &streak_update {
        ws::notify_milestone(state.ws_tx.as_ref(), auth_user.id, update);
    }

    Ok(Json(SendHugResponse { hug, streak_update }))
}

pub async fn list_received_hugs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Hug>>> {
    let hugs = sqlx::query_as::<_, Hug>(
        r#"
        SELECT * FROM hugs
        WHERE recipient_id = $1
        ORDER BY created_at DESC
        LIMIT 100
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(hugs))
}
