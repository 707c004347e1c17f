//! Streak milestone table and reward resolution.
//!
//! Milestones are fixed and ascending. A transition from `old` to `new`
//! fires at most one milestone: the first one strictly above `old` and at
//! or below `new`. Decreases and resets never fire.

use crate::models::reward::RewardType;

/// Ascending streak lengths that trigger reward issuance.
pub const MILESTONES: &[i32] = &[3, 7, 14, 21, 30, 60, 90, 180, 365];

/// A reward definition from the milestone table, prior to materialization
/// as a `StreakReward` row.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardSpec {
    pub reward_type: RewardType,
    pub reward_id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub value: Option<f64>,
}

/// The predefined reward list for a milestone. Every milestone carries a
/// badge; points start at 7 days; unlockable content appears at 21, 30,
/// 90, 180 and 365 days.
pub fn rewards_for_milestone(milestone: i32) -> Vec<RewardSpec> {
    let badge = |id, name, description| RewardSpec {
        reward_type: RewardType::Badge,
        reward_id: id,
        name,
        description,
        value: None,
    };
    let points = |id, name, amount: f64| RewardSpec {
        reward_type: RewardType::Points,
        reward_id: id,
        name,
        description: "Streak points added to your balance",
        value: Some(amount),
    };

    match milestone {
        3 => vec![badge(
            "badge_streak_3",
            "Getting Started",
            "Three days of wellness activity in a row",
        )],
        7 => vec![
            badge(
                "badge_streak_7",
                "One Week Strong",
                "A full week of daily wellness activity",
            ),
            points("points_streak_7", "7-Day Bonus", 50.0),
        ],
        14 => vec![
            badge(
                "badge_streak_14",
                "Two Week Habit",
                "Fourteen consecutive days of activity",
            ),
            points("points_streak_14", "14-Day Bonus", 100.0),
        ],
        21 => vec![
            badge(
                "badge_streak_21",
                "Three Week Streak",
                "Twenty-one consecutive days of activity",
            ),
            points("points_streak_21", "21-Day Bonus", 150.0),
            RewardSpec {
                reward_type: RewardType::HugType,
                reward_id: "hug_warm_embrace",
                name: "Warm Embrace",
                description: "A special hug type unlocked at 21 days",
                value: None,
            },
        ],
        30 => vec![
            badge(
                "badge_streak_30",
                "Monthly Milestone",
                "Thirty consecutive days of activity",
            ),
            points("points_streak_30", "30-Day Bonus", 200.0),
            RewardSpec {
                reward_type: RewardType::Theme,
                reward_id: "theme_sunrise",
                name: "Sunrise Theme",
                description: "An app theme unlocked at 30 days",
                value: None,
            },
        ],
        60 => vec![
            badge(
                "badge_streak_60",
                "Two Month Champion",
                "Sixty consecutive days of activity",
            ),
            points("points_streak_60", "60-Day Bonus", 300.0),
        ],
        90 => vec![
            badge(
                "badge_streak_90",
                "Quarterly Achiever",
                "Ninety consecutive days of activity",
            ),
            points("points_streak_90", "90-Day Bonus", 500.0),
            RewardSpec {
                reward_type: RewardType::AvatarItem,
                reward_id: "avatar_golden_halo",
                name: "Golden Halo",
                description: "An avatar item unlocked at 90 days",
                value: None,
            },
        ],
        180 => vec![
            badge(
                "badge_streak_180",
                "Half Year Hero",
                "One hundred eighty consecutive days of activity",
            ),
            points("points_streak_180", "180-Day Bonus", 750.0),
            RewardSpec {
                reward_type: RewardType::HugType,
                reward_id: "hug_radiant_glow",
                name: "Radiant Glow",
                description: "A special hug type unlocked at 180 days",
                value: None,
            },
        ],
        365 => vec![
            badge(
                "badge_streak_365",
                "Year of Wellness",
                "A full year of daily wellness activity",
            ),
            points("points_streak_365", "365-Day Bonus", 1000.0),
            RewardSpec {
                reward_type: RewardType::Theme,
                reward_id: "theme_aurora",
                name: "Aurora Theme",
                description: "An app theme unlocked at 365 days",
                value: None,
            },
            RewardSpec {
                reward_type: RewardType::AvatarItem,
                reward_id: "avatar_phoenix_wings",
                name: "Phoenix Wings",
                description: "An avatar item unlocked at 365 days",
                value: None,
            },
        ],
        _ => vec![],
    }
}

/// Return the first milestone crossed by the transition `old -> new` with
/// its reward list, or `None` when no milestone was crossed. Only fires on
/// an increase.
pub fn check_streak_milestone(old: i32, new: i32) -> Option<(i32, Vec<RewardSpec>)> {
    if new <= old {
        return None;
    }
    MILESTONES
        .iter()
        .find(|&&m| old < m && m <= new)
        .map(|&m| (m, rewards_for_milestone(m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_day_milestone_grants_badge_and_fifty_points() {
        let (milestone, rewards) = check_streak_milestone(6, 7).expect("milestone expected");
        assert_eq!(milestone, 7);
        assert_eq!(rewards.len(), 2);
        assert!(rewards
            .iter()
            .any(|r| r.reward_type == RewardType::Badge));
        let points = rewards
            .iter()
            .find(|r| r.reward_type == RewardType::Points)
            .expect("points reward expected");
        assert_eq!(points.value, Some(50.0));
    }

    #[test]
    fn no_increase_no_milestone() {
        assert!(check_streak_milestone(7, 7).is_none());
        assert!(check_streak_milestone(10, 4).is_none());
        assert!(check_streak_milestone(30, 0).is_none());
    }

    #[test]
    fn below_first_milestone_returns_none() {
        assert!(check_streak_milestone(0, 1).is_none());
        assert!(check_streak_milestone(1, 2).is_none());
    }

    #[test]
    fn jump_across_several_milestones_fires_first_only() {
        // 2 -> 15 skips past 3, 7 and 14; only the first (3) fires.
        let (milestone, _) = check_streak_milestone(2, 15).expect("milestone expected");
        assert_eq!(milestone, 3);
    }

    #[test]
    fn every_milestone_has_a_badge() {
        for &m in MILESTONES {
            let rewards = rewards_for_milestone(m);
            assert!(
                rewards.iter().any(|r| r.reward_type == RewardType::Badge),
                "milestone {m} has no badge"
            );
        }
    }

    #[test]
    fn points_start_at_seven_days() {
        assert!(!rewards_for_milestone(3)
            .iter()
            .any(|r| r.reward_type == RewardType::Points));
        for &m in &MILESTONES[1..] {
            assert!(
                rewards_for_milestone(m)
                    .iter()
                    .any(|r| r.reward_type == RewardType::Points),
                "milestone {m} has no points reward"
            );
        }
    }

    #[test]
    fn reward_keys_are_unique_within_each_milestone() {
        // Grants are deduped on (user_id, milestone, reward_type,
        // reward_id); a duplicate pair inside one milestone's list would
        // silently drop a reward instead of granting it.
        use std::collections::HashSet;

        for &m in MILESTONES {
            let rewards = rewards_for_milestone(m);
            let keys: HashSet<_> = rewards
                .iter()
                .map(|r| (r.reward_type, r.reward_id))
                .collect();
            assert_eq!(
                keys.len(),
                rewards.len(),
                "duplicate reward key in milestone {m}"
            );
        }
    }

    #[test]
    fn resolving_the_same_transition_twice_is_stable() {
        let first = check_streak_milestone(6, 7).expect("milestone expected");
        let second = check_streak_milestone(6, 7).expect("milestone expected");
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn unlockable_content_at_documented_milestones() {
        let has_content = |m: i32| {
            rewards_for_milestone(m).iter().any(|r| {
                matches!(
                    r.reward_type,
                    RewardType::HugType | RewardType::Theme | RewardType::AvatarItem
                )
            })
        };
        for m in [21, 30, 90, 180, 365] {
            assert!(has_content(m), "milestone {m} should unlock content");
        }
        for m in [3, 7, 14, 60] {
            assert!(!has_content(m), "milestone {m} should not unlock content");
        }
    }
}
