//! Mood analytics: frequency tables, day/time breakdowns, variability,
//! trend, and the rule tables that turn them into insight text.
//!
//! Everything here is a pure function of the entry list handed in by the
//! handler. Nothing is persisted; callers may cache if they need to.

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};
use serde::Serialize;

use crate::models::mood::MoodEntry;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Mood groups in tie-break order: when two groups have the same summed
/// frequency, the earlier one wins.
const MOOD_GROUPS: [(&str, &[&str]); 6] = [
    ("joyful", &["happy", "excited", "joyful", "ecstatic", "proud"]),
    ("peaceful", &["calm", "content", "relaxed", "peaceful", "grateful"]),
    ("neutral", &["neutral", "okay", "bored", "tired"]),
    ("sad", &["sad", "lonely", "disappointed", "depressed"]),
    ("anxious", &["anxious", "stressed", "nervous", "overwhelmed"]),
    ("angry", &["angry", "frustrated", "irritated"]),
];

/// Numeric value (1-10) for a mood label; unknown labels map to 5.
fn mood_value(mood: &str) -> f64 {
    match mood {
        "ecstatic" => 10.0,
        "excited" => 9.0,
        "joyful" => 9.0,
        "happy" => 8.0,
        "proud" => 8.0,
        "grateful" => 8.0,
        "content" => 7.0,
        "peaceful" => 7.0,
        "relaxed" => 7.0,
        "calm" => 6.0,
        "okay" => 5.0,
        "neutral" => 5.0,
        "bored" => 4.0,
        "tired" => 4.0,
        "nervous" => 4.0,
        "disappointed" => 3.0,
        "anxious" => 3.0,
        "stressed" => 3.0,
        "frustrated" => 3.0,
        "lonely" => 3.0,
        "sad" => 2.0,
        "overwhelmed" => 2.0,
        "irritated" => 3.0,
        "angry" => 2.0,
        "depressed" => 1.0,
        _ => 5.0,
    }
}

fn mood_group(mood: &str) -> Option<&'static str> {
    MOOD_GROUPS
        .iter()
        .find(|(_, members)| members.contains(&mood))
        .map(|(group, _)| *group)
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct MoodBucket {
    pub count: i64,
    pub total: f64,
    pub average: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_entries: usize,
    pub time_range_days: i64,
    pub dominant_mood: Option<String>,
    pub dominant_mood_group: String,
    pub average_mood_value: Option<f64>,
    pub mood_variability: &'static str,
    pub trend: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MoodAnalytics {
    pub summary: AnalyticsSummary,
    pub mood_frequency: BTreeMap<String, i64>,
    pub mood_by_day_of_week: BTreeMap<String, MoodBucket>,
    pub mood_by_time_of_day: BTreeMap<String, MoodBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_correlations: Option<BTreeMap<String, MoodBucket>>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn time_of_day(hour: u32) -> &'static str {
    match hour {
        5..=11 => "morning",
        12..=16 => "afternoon",
        17..=21 => "evening",
        _ => "night",
    }
}

/// Population standard deviation classification. Requires at least 5
/// entries; below that the data is too thin to call.
pub fn mood_variability(values: &[f64]) -> &'static str {
    if values.len() < 5 {
        return "insufficient_data";
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    if stddev < 1.0 {
        "low"
    } else if stddev < 2.0 {
        "moderate"
    } else {
        "high"
    }
}

/// Ordinary-least-squares slope of mood value against chronological index.
/// Requires at least 7 entries.
pub fn mood_trend(values: &[f64]) -> &'static str {
    if values.len() < 7 {
        return "insufficient_data";
    }
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    let slope = if den == 0.0 { 0.0 } else { num / den };

    if slope > 0.05 {
        "improving"
    } else if slope < -0.05 {
        "declining"
    } else {
        "stable"
    }
}

/// Group with the highest summed frequency; ties broken by table order.
/// Empty input defaults to "neutral".
fn dominant_mood_group(frequency: &BTreeMap<String, i64>) -> &'static str {
    let mut best = ("neutral", 0i64);
    for (group, members) in MOOD_GROUPS {
        let sum: i64 = members
            .iter()
            .filter_map(|m| frequency.get(*m))
            .sum();
        if sum > best.1 {
            best = (group, sum);
        }
    }
    best.0
}

/// Day bucket with the highest average, among days with at least 3 entries.
fn best_day(by_day: &BTreeMap<String, MoodBucket>) -> Option<(&str, f64)> {
    DAY_NAMES
        .iter()
        .filter_map(|day| {
            let bucket = by_day.get(*day)?;
            (bucket.count >= 3).then_some((*day, bucket.average))
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

fn recommendation_for_group(group: &str) -> &'static str {
    match group {
        "joyful" => "You've been feeling great — share a hug to spread the mood.",
        "peaceful" => "Your calm streak is worth protecting. Keep your current routines going.",
        "sad" => "Reaching out helps: send a hug to a friend or write a short gratitude note.",
        "anxious" => "Try a short meditation session — even five minutes can lower stress.",
        "angry" => "Physical activity is a reliable outlet — log an exercise session today.",
        _ => "Log your mood daily to build a clearer picture of your patterns.",
    }
}

/// Build the full analytics payload for a user's mood entries.
///
/// `entries` must already be filtered to the requested time range and
/// sorted oldest-first (the trend computation depends on chronological
/// order). Zero entries produce the documented empty-state payload.
pub fn generate_mood_analytics(
    entries: &[MoodEntry],
    time_range_days: i64,
    include_correlations: bool,
) -> MoodAnalytics {
    let mut mood_frequency: BTreeMap<String, i64> = BTreeMap::new();
    let mut by_day: BTreeMap<String, MoodBucket> = BTreeMap::new();
    let mut by_time: BTreeMap<String, MoodBucket> = BTreeMap::new();
    let mut values: Vec<f64> = Vec::with_capacity(entries.len());

    for entry in entries {
        let value = mood_value(&entry.mood);
        values.push(value);

        *mood_frequency.entry(entry.mood.clone()).or_insert(0) += 1;

        let day = DAY_NAMES[entry.created_at.weekday().num_days_from_monday() as usize];
        let bucket = by_day.entry(day.to_string()).or_default();
        bucket.count += 1;
        bucket.total += value;

        let slot = time_of_day(entry.created_at.hour());
        let bucket = by_time.entry(slot.to_string()).or_default();
        bucket.count += 1;
        bucket.total += value;
    }

    for bucket in by_day.values_mut().chain(by_time.values_mut()) {
        bucket.average = round1(bucket.total / bucket.count as f64);
        bucket.total = round1(bucket.total);
    }

    let dominant_mood = mood_frequency
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(mood, _)| mood.clone());
    let dominant_group = dominant_mood_group(&mood_frequency);
    let variability = mood_variability(&values);
    let trend = mood_trend(&values);
    let average_mood_value = (!values.is_empty())
        .then(|| round1(values.iter().sum::<f64>() / values.len() as f64));

    let activity_correlations =
        include_correlations.then(|| correlate_activities(entries));

    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    if entries.is_empty() {
        recommendations
            .push("Log your mood daily to start building personalized insights.".to_string());
    } else {
        if let Some(mood) = &dominant_mood {
            insights.push(format!(
                "Your most frequent mood over the last {time_range_days} days was \"{mood}\"."
            ));
        }
        if let Some((day, average)) = best_day(&by_day) {
            insights.push(format!(
                "{day} tends to be your best day, averaging {average:.1} out of 10."
            ));
        }
        match variability {
            "low" => insights
                .push("Your mood has been steady with little day-to-day variation.".to_string()),
            "high" => insights.push(
                "Your mood swings noticeably from day to day — worth watching what drives the dips."
                    .to_string(),
            ),
            _ => {}
        }
        match trend {
            "improving" => {
                insights.push("Your overall mood has been trending upward.".to_string())
            }
            "declining" => {
                insights.push("Your overall mood has been trending downward lately.".to_string())
            }
            _ => {}
        }

        recommendations.push(recommendation_for_group(dominant_group).to_string());
        if trend == "declining" {
            recommendations.push(
                "Consider scheduling something you enjoy this week — declines often reverse with one good day."
                    .to_string(),
            );
        }
    }

    MoodAnalytics {
        summary: AnalyticsSummary {
            total_entries: entries.len(),
            time_range_days,
            dominant_mood,
            dominant_mood_group: dominant_group.to_string(),
            average_mood_value,
            mood_variability: variability,
            trend,
        },
        mood_frequency,
        mood_by_day_of_week: by_day,
        mood_by_time_of_day: by_time,
        activity_correlations,
        insights,
        recommendations,
    }
}

/// Average mood value per co-logged activity tag (e.g. "exercise",
/// "socializing"). Only meaningful when entries carry an activities list.
fn correlate_activities(entries: &[MoodEntry]) -> BTreeMap<String, MoodBucket> {
    let mut buckets: BTreeMap<String, MoodBucket> = BTreeMap::new();
    for entry in entries {
        let value = mood_value(&entry.mood);
        let Some(tags) = entry.activities.as_array() else {
            continue;
        };
        for tag in tags.iter().filter_map(|t| t.as_str()) {
            let bucket = buckets.entry(tag.to_string()).or_default();
            bucket.count += 1;
            bucket.total += value;
        }
    }
    for bucket in buckets.values_mut() {
        bucket.average = round1(bucket.total / bucket.count as f64);
        bucket.total = round1(bucket.total);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn entry(mood: &str, at: DateTime<Utc>) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            mood: mood.to_string(),
            intensity: 5,
            note: None,
            is_public: false,
            activities: serde_json::json!([]),
            location: None,
            created_at: at,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2025, 6, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn variability_thresholds() {
        assert_eq!(mood_variability(&[5.0, 5.0, 5.0, 5.0, 5.0]), "low");
        assert_eq!(mood_variability(&[1.0, 10.0, 1.0, 10.0, 1.0]), "high");
        assert_eq!(mood_variability(&[3.0, 6.0, 3.0, 6.0, 3.0]), "moderate");
        assert_eq!(mood_variability(&[5.0, 5.0]), "insufficient_data");
    }

    #[test]
    fn trend_classification() {
        let rising: Vec<f64> = (1..=7).map(|v| v as f64).collect();
        assert_eq!(mood_trend(&rising), "improving");

        let flat = vec![5.0; 7];
        assert_eq!(mood_trend(&flat), "stable");

        let falling: Vec<f64> = (1..=7).rev().map(|v| v as f64).collect();
        assert_eq!(mood_trend(&falling), "declining");

        assert_eq!(mood_trend(&[1.0, 2.0, 3.0]), "insufficient_data");
    }

    #[test]
    fn unknown_mood_maps_to_midpoint() {
        assert_eq!(mood_value("flabbergasted"), 5.0);
    }

    #[test]
    fn empty_entries_produce_starter_payload() {
        let analytics = generate_mood_analytics(&[], 30, false);
        assert_eq!(analytics.summary.total_entries, 0);
        assert_eq!(analytics.summary.dominant_mood_group, "neutral");
        assert_eq!(analytics.summary.mood_variability, "insufficient_data");
        assert_eq!(analytics.summary.trend, "insufficient_data");
        assert!(analytics.summary.dominant_mood.is_none());
        assert_eq!(analytics.recommendations.len(), 1);
        assert!(analytics.insights.is_empty());
    }

    #[test]
    fn frequency_and_dominant_group() {
        let entries = vec![
            entry("happy", at(2, 9)),
            entry("happy", at(3, 9)),
            entry("excited", at(4, 9)),
            entry("sad", at(5, 9)),
        ];
        let analytics = generate_mood_analytics(&entries, 30, false);
        assert_eq!(analytics.mood_frequency["happy"], 2);
        assert_eq!(analytics.summary.dominant_mood.as_deref(), Some("happy"));
        // joyful group: happy(2) + excited(1) = 3 beats sad(1)
        assert_eq!(analytics.summary.dominant_mood_group, "joyful");
    }

    #[test]
    fn time_of_day_boundaries() {
        assert_eq!(time_of_day(4), "night");
        assert_eq!(time_of_day(5), "morning");
        assert_eq!(time_of_day(11), "morning");
        assert_eq!(time_of_day(12), "afternoon");
        assert_eq!(time_of_day(16), "afternoon");
        assert_eq!(time_of_day(17), "evening");
        assert_eq!(time_of_day(21), "evening");
        assert_eq!(time_of_day(22), "night");
    }

    #[test]
    fn day_buckets_track_count_and_average() {
        // 2025-06-02 is a Monday.
        let entries = vec![
            entry("happy", at(2, 9)),    // Monday, 8
            entry("sad", at(2, 20)),     // Monday, 2
            entry("neutral", at(3, 13)), // Tuesday, 5
        ];
        let analytics = generate_mood_analytics(&entries, 30, false);
        let monday = &analytics.mood_by_day_of_week["Monday"];
        assert_eq!(monday.count, 2);
        assert_eq!(monday.average, 5.0);
        let tuesday = &analytics.mood_by_day_of_week["Tuesday"];
        assert_eq!(tuesday.count, 1);
        assert_eq!(tuesday.average, 5.0);

        let morning = &analytics.mood_by_time_of_day["morning"];
        assert_eq!(morning.count, 1);
    }

    #[test]
    fn correlations_bucket_by_activity_tag() {
        let mut e1 = entry("happy", at(2, 9));
        e1.activities = serde_json::json!(["exercise", "socializing"]);
        let mut e2 = entry("sad", at(3, 9));
        e2.activities = serde_json::json!(["work"]);

        let analytics = generate_mood_analytics(&[e1, e2], 30, true);
        let correlations = analytics.activity_correlations.expect("requested");
        assert_eq!(correlations["exercise"].count, 1);
        assert_eq!(correlations["exercise"].average, 8.0);
        assert_eq!(correlations["work"].average, 2.0);
    }

    #[test]
    fn correlations_omitted_unless_requested() {
        let analytics = generate_mood_analytics(&[], 30, false);
        assert!(analytics.activity_correlations.is_none());
    }

    #[test]
    fn best_day_requires_three_entries() {
        // Two great Saturdays should not beat three average Mondays.
        let entries = vec![
            entry("ecstatic", at(7, 10)),  // Saturday
            entry("ecstatic", at(14, 10)), // Saturday
            entry("neutral", at(2, 10)),   // Monday
            entry("neutral", at(9, 10)),   // Monday
            entry("neutral", at(16, 10)),  // Monday
        ];
        let analytics = generate_mood_analytics(&entries, 30, false);
        let best = analytics
            .insights
            .iter()
            .find(|i| i.contains("best day"))
            .expect("best-day insight expected");
        assert!(best.contains("Monday"), "insight was: {best}");
    }
}
