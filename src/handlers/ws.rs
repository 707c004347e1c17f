use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::jwt::{verify_token, TokenType};
use crate::models::streak::StreakUpdate;
use crate::AppState;

/// Push a milestone-reached notification to the affected user's live
/// connection. Best-effort: silently dropped when nobody is listening.
pub fn notify_milestone(
    tx: Option<&broadcast::Sender<String>>,
    user_id: Uuid,
    update: &StreakUpdate,
) {
    let (Some(tx), Some(milestone)) = (tx, update.milestone_reached) else {
        return;
    };
    let msg = serde_json::json!({
        "type": "milestone_reached",
        "user_id": user_id,
        "milestone": milestone,
        "current_streak": update.current_streak,
        "rewards": update.rewards_granted,
    });
    let _ = tx.send(msg.to_string());
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Response {
    let user_id = match authenticate_ws(&state, query.token.as_deref()) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("WebSocket auth failed: {}", e);
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

fn authenticate_ws(state: &AppState, token: Option<&str>) -> Result<Uuid, &'static str> {
    let token = token.ok_or("Missing token query parameter")?;

    let token_data =
        verify_token(token, &state.config).map_err(|_| "Invalid or expired token")?;

    if token_data.claims.token_type != TokenType::Access {
        return Err("Must use access token for WebSocket");
    }

    Ok(token_data.claims.sub)
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();

    tracing::debug!(user_id = %user_id, "WebSocket connection established");

    let mut rx = match state.ws_tx.as_ref() {
        Some(tx) => tx.subscribe(),
        None => return,
    };

    // Forward broadcast messages addressed to this user. Messages without a
    // user_id field fan out to everyone.
    let uid = user_id;
    let mut send_task = tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&msg) {
                if let Some(msg_user_id) = parsed.get("user_id").and_then(|v| v.as_str()) {
                    if msg_user_id != uid.to_string() {
                        continue;
                    }
                }
            }
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Drain client messages; delivery is one-way, but a clean close should
    // tear the connection down.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    tracing::debug!(user_id = %user_id, message = %text, "WebSocket message received");
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!(user_id = %user_id, "WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(milestone: Option<i32>) -> StreakUpdate {
        StreakUpdate {
            current_streak: 7,
            longest_streak: 7,
            streak_increased: true,
            milestone_reached: milestone,
            rewards_granted: vec![],
        }
    }

    #[test]
    fn milestone_notification_addresses_the_affected_user() {
        let (tx, mut rx) = broadcast::channel(8);
        let recipient = Uuid::new_v4();

        notify_milestone(Some(&tx), recipient, &update(Some(7)));

        let msg = rx.try_recv().expect("notification expected");
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["type"], "milestone_reached");
        assert_eq!(
            parsed["user_id"].as_str(),
            Some(recipient.to_string().as_str())
        );
        assert_eq!(parsed["milestone"], 7);
    }

    #[test]
    fn no_notification_without_a_milestone() {
        let (tx, mut rx) = broadcast::channel(8);

        notify_milestone(Some(&tx), Uuid::new_v4(), &update(None));

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn no_channel_is_a_no_op() {
        notify_milestone(None, Uuid::new_v4(), &update(Some(3)));
    }
}
