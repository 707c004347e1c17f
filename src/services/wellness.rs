//! Wellness activity recording and streak bookkeeping.
//!
//! The activity log is the source of truth: every update recomputes the
//! streak from the full history rather than trusting incremental counters,
//! so a missed update self-corrects on the next write.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::activity::{ActivityType, WellnessActivity};
use crate::models::reward::{ClaimResult, StreakReward};
use crate::models::streak::{
    CurrentStreak, StreakHistoryEntry, StreakInfoResponse, StreakUpdate, UserStreak,
};
use crate::services::milestones::{check_streak_milestone, RewardSpec};
use crate::services::streaks;

/// Append an activity to the log and run the streak update protocol.
///
/// Callers for which streak bookkeeping is secondary (mood save, hug send)
/// should log and swallow the error rather than failing the parent action.
pub async fn record_activity(
    db: &PgPool,
    user_id: Uuid,
    activity_type: ActivityType,
    related_entity_id: Option<Uuid>,
    metadata: Option<serde_json::Value>,
) -> AppResult<(WellnessActivity, StreakUpdate)> {
    let activity = sqlx::query_as::<_, WellnessActivity>(
        r#"
        INSERT INTO wellness_activities (id, user_id, activity_type, related_entity_id, metadata, streak_points)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(activity_type)
    .bind(related_entity_id)
    .bind(metadata.unwrap_or_else(|| serde_json::json!({})))
    .bind(activity_type.streak_points())
    .fetch_one(db)
    .await?;

    let update = update_user_streak(db, user_id, activity_type).await?;

    Ok((activity, update))
}

/// Recompute the streak from the log (post-reset window) and upsert the
/// per-user aggregate. Returns what changed so the caller can notify the
/// user.
async fn update_user_streak(
    db: &PgPool,
    user_id: Uuid,
    activity_type: ActivityType,
) -> AppResult<StreakUpdate> {
    let existing = sqlx::query_as::<_, UserStreak>(
        "SELECT * FROM user_streaks WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    // Activity from before the latest admin reset stays in the log but no
    // longer feeds the streak.
    let reset_at = existing.as_ref().and_then(|row| row.last_reset_at);
    let timestamps =
        streaks::since_reset(&activity_timestamps(db, user_id).await?, reset_at);
    let today = Utc::now().date_naive();

    let current = streaks::current_streak(&timestamps, today);
    let longest = streaks::longest_streak(&timestamps);
    let now = Utc::now();

    let (old_streak, streak_changed) = match &existing {
        Some(row) => (row.current_streak, row.current_streak != current.count),
        None => (0, true),
    };
    let streak_increased = current.count > old_streak;

    let history_entry = streak_changed.then(|| StreakHistoryEntry {
        date: today,
        streak: current.count,
        reset: false,
    });
    let history_json = history_entry
        .as_ref()
        .map(|e| serde_json::to_value([e]).unwrap_or_else(|_| serde_json::json!([])))
        .unwrap_or_else(|| serde_json::json!([]));

    let (mood_inc, sent_inc, received_inc): (i64, i64, i64) = match activity_type {
        ActivityType::MoodLog => (1, 0, 0),
        ActivityType::HugSent => (0, 1, 0),
        ActivityType::HugReceived => (0, 0, 1),
        _ => (0, 0, 0),
    };

    sqlx::query(
        r#"
        INSERT INTO user_streaks (
            user_id, current_streak, longest_streak,
            last_activity_date, last_streak_update_date,
            total_mood_entries, total_hugs_sent, total_hugs_received,
            streak_history
        )
        VALUES ($1, $2, GREATEST($2, $3), $4, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE SET
            current_streak = $2,
            longest_streak = GREATEST(user_streaks.longest_streak, $2, $3),
            last_activity_date = $4,
            last_streak_update_date = $4,
            total_mood_entries = user_streaks.total_mood_entries + $5,
            total_hugs_sent = user_streaks.total_hugs_sent + $6,
            total_hugs_received = user_streaks.total_hugs_received + $7,
            streak_history = user_streaks.streak_history || $8,
            updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(current.count)
    .bind(longest)
    .bind(now)
    .bind(mood_inc)
    .bind(sent_inc)
    .bind(received_inc)
    .bind(history_json)
    .execute(db)
    .await?;

    // Milestones fire only on an increase, never on decrease or reset.
    let mut milestone_reached = None;
    let mut rewards_granted = Vec::new();
    if streak_increased {
        if let Some((milestone, specs)) = check_streak_milestone(old_streak, current.count) {
            milestone_reached = Some(milestone);
            rewards_granted = grant_milestone_rewards(db, user_id, milestone, &specs).await?;
            tracing::info!(
                user_id = %user_id,
                milestone = milestone,
                rewards = rewards_granted.len(),
                "Streak milestone reached"
            );
        }
    }

    Ok(StreakUpdate {
        current_streak: current.count,
        longest_streak: longest.max(current.count),
        streak_increased,
        milestone_reached,
        rewards_granted,
    })
}

/// Materialize reward rows for a crossed milestone. The unique key on
/// `(user_id, milestone, reward_type, reward_id)` makes this idempotent:
/// re-processing the same transition inserts nothing and awards no points
/// twice. Point rewards auto-claim on insert.
async fn grant_milestone_rewards(
    db: &PgPool,
    user_id: Uuid,
    milestone: i32,
    specs: &[RewardSpec],
) -> AppResult<Vec<StreakReward>> {
    let mut granted = Vec::with_capacity(specs.len());
    let now = Utc::now();

    for spec in specs {
        let auto_claim = spec.value.is_some();
        let inserted = sqlx::query_as::<_, StreakReward>(
            r#"
            INSERT INTO streak_rewards (
                id, user_id, milestone, reward_type, reward_id,
                reward_name, reward_description, reward_value,
                is_claimed, claimed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id, milestone, reward_type, reward_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(milestone)
        .bind(spec.reward_type)
        .bind(spec.reward_id)
        .bind(spec.name)
        .bind(spec.description)
        .bind(spec.value)
        .bind(auto_claim)
        .bind(auto_claim.then_some(now))
        .fetch_optional(db)
        .await?;

        let Some(reward) = inserted else {
            // Already granted for this transition; nothing more to do.
            continue;
        };

        if let Some(points) = reward.reward_value {
            sqlx::query(
                "UPDATE user_streaks SET streak_points = streak_points + $2, updated_at = NOW() WHERE user_id = $1",
            )
            .bind(user_id)
            .bind(points)
            .execute(db)
            .await?;
        }

        granted.push(reward);
    }

    Ok(granted)
}

/// Current streak state plus unclaimed rewards. The `needs_activity` and
/// `active_today` flags are recomputed from the log rather than read from
/// the stored row, which goes stale overnight.
pub async fn get_streak_info(db: &PgPool, user_id: Uuid) -> AppResult<StreakInfoResponse> {
    let row = sqlx::query_as::<_, UserStreak>(
        "SELECT * FROM user_streaks WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    let current = compute_current_streak(db, user_id).await?;

    let pending_rewards = sqlx::query_as::<_, StreakReward>(
        r#"
        SELECT * FROM streak_rewards
        WHERE user_id = $1 AND is_claimed = FALSE
          AND (expires_at IS NULL OR expires_at > NOW())
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(match row {
        Some(row) => StreakInfoResponse {
            current_streak: current.count,
            longest_streak: row.longest_streak.max(current.count),
            last_activity_date: row.last_activity_date,
            streak_points: row.streak_points,
            needs_activity: current.needs_activity,
            active_today: current.active_today,
            total_mood_entries: row.total_mood_entries,
            total_hugs_sent: row.total_hugs_sent,
            total_hugs_received: row.total_hugs_received,
            pending_rewards,
        },
        None => StreakInfoResponse {
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            streak_points: 0.0,
            needs_activity: true,
            active_today: false,
            total_mood_entries: 0,
            total_hugs_sent: 0,
            total_hugs_received: 0,
            pending_rewards,
        },
    })
}

/// Claim a granted reward. Unknown or already-claimed rewards return a
/// failure body rather than an error; the false -> true transition happens
/// at most once because the claim predicate is part of the UPDATE.
pub async fn claim_reward(db: &PgPool, user_id: Uuid, reward_id: Uuid) -> AppResult<ClaimResult> {
    let claimed = sqlx::query_as::<_, StreakReward>(
        r#"
        UPDATE streak_rewards
        SET is_claimed = TRUE, claimed_at = NOW()
        WHERE id = $1 AND user_id = $2 AND is_claimed = FALSE
          AND (expires_at IS NULL OR expires_at > NOW())
        RETURNING *
        "#,
    )
    .bind(reward_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(match claimed {
        Some(reward) => ClaimResult {
            success: true,
            message: None,
            reward: Some(reward),
        },
        None => ClaimResult {
            success: false,
            message: Some("Reward not found, expired, or already claimed".into()),
            reward: None,
        },
    })
}

/// Administrative reset: zero the current streak and append a reset marker
/// to the history. The longest streak is preserved.
pub async fn reset_streak(db: &PgPool, user_id: Uuid) -> AppResult<UserStreak> {
    let marker = serde_json::to_value([StreakHistoryEntry {
        date: Utc::now().date_naive(),
        streak: 0,
        reset: true,
    }])
    .unwrap_or_else(|_| serde_json::json!([]));

    sqlx::query_as::<_, UserStreak>(
        r#"
        UPDATE user_streaks
        SET current_streak = 0,
            streak_history = streak_history || $2,
            last_reset_at = NOW(),
            last_streak_update_date = NOW(),
            updated_at = NOW()
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(marker)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound("No streak record for user".into()))
}

/// Recompute the current streak without writing anything. Used by read
/// paths that only need the derived flags. Respects the latest reset.
pub async fn compute_current_streak(db: &PgPool, user_id: Uuid) -> AppResult<CurrentStreak> {
    let reset_at = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
        "SELECT last_reset_at FROM user_streaks WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .flatten();

    let timestamps = streaks::since_reset(&activity_timestamps(db, user_id).await?, reset_at);
    Ok(streaks::current_streak(&timestamps, Utc::now().date_naive()))
}

async fn activity_timestamps(db: &PgPool, user_id: Uuid) -> AppResult<Vec<DateTime<Utc>>> {
    let timestamps = sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT created_at FROM wellness_activities WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(timestamps)
}
