// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integration tests for per-provider normalization
//!
//! Each fixture mirrors a payload as the matching sync client receives it.

use chrono::{TimeZone, Utc};
use health_reconciler::models::ActivityType;
use health_reconciler::{normalize, normalize_sleep, NormalizationError};
use serde_json::json;

#[test]
fn test_strava_run() {
    let raw = json!({
        "id": 1001,
        "name": "Morning Run",
        "type": "Run",
        "start_date": "2024-01-15T08:00:00Z",
        "moving_time": 1800,
        "elapsed_time": 1850,
        "distance": 5000.0,
        "total_elevation_gain": 100.0
    });

    let activity = normalize("strava", &raw).unwrap();
    assert_eq!(activity.source, "strava");
    assert_eq!(activity.original_id, "1001");
    assert_eq!(activity.activity_type, ActivityType::Run);
    assert_eq!(activity.duration_seconds, 1800);
    assert_eq!(activity.distance_meters, 5000.0);
    assert_eq!(
        activity.end_time(),
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()
    );
}

#[test]
fn test_strava_unmapped_type_is_unknown() {
    let raw = json!({
        "id": 1002,
        "type": "Kitesurf",
        "start_date": "2024-01-15T08:00:00Z",
        "moving_time": 3600
    });

    let activity = normalize("strava", &raw).unwrap();
    assert_eq!(activity.activity_type, ActivityType::Unknown);
    assert_eq!(activity.duration_seconds, 3600);
}

#[test]
fn test_apple_health_workout() {
    let raw = json!({
        "uuid": "5A3C-11",
        "workoutActivityType": "HKWorkoutActivityTypeSwimming",
        "startDate": "2024-01-15T06:00:00+01:00",
        "duration": 2700,
        "totalDistance": 1500,
        "totalEnergyBurned": 410.5
    });

    let activity = normalize("apple_health", &raw).unwrap();
    assert_eq!(activity.original_id, "5A3C-11");
    assert_eq!(activity.activity_type, ActivityType::Swim);
    assert_eq!(
        activity.start_time,
        Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap()
    );
    assert_eq!(activity.calories, 410.5);
}

#[test]
fn test_health_connect_duration_from_interval() {
    let start = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    let raw = json!({
        "metadata": {"id": "hc-77"},
        "exerciseType": "EXERCISE_TYPE_BIKING",
        "startTime": start.timestamp_millis(),
        "endTime": start.timestamp_millis() + 45 * 60 * 1000,
        "totalDistance": 15000
    });

    let activity = normalize("health_connect", &raw).unwrap();
    assert_eq!(activity.original_id, "hc-77");
    assert_eq!(activity.activity_type, ActivityType::Cycle);
    assert_eq!(activity.duration_seconds, 45 * 60);
    assert_eq!(activity.distance_meters, 15000.0);
}

#[test]
fn test_fitbit_distance_unit_label() {
    let raw = json!({
        "logId": 9001,
        "activityName": "Run",
        "startTime": "2024-01-15T07:00:00.000-05:00",
        "duration": 1_500_000,
        "distance": 3.1,
        "distanceUnit": "Mile",
        "calories": 320
    });

    let activity = normalize("fitbit", &raw).unwrap();
    assert_eq!(activity.duration_seconds, 1500);
    assert!((activity.distance_meters - 3.1 * 1609.344).abs() < 1e-6);
    assert_eq!(
        activity.start_time,
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    );

    let metric = json!({
        "logId": 9002,
        "activityName": "Walk",
        "startTime": "2024-01-15T07:00:00.000-05:00",
        "distance": 2.5
    });
    assert_eq!(normalize("fitbit", &metric).unwrap().distance_meters, 2500.0);
}

#[test]
fn test_oura_workout() {
    let raw = json!({
        "id": "oura-w-1",
        "activity": "walking",
        "start_datetime": "2024-01-15T17:00:00+00:00",
        "end_datetime": "2024-01-15T17:40:00+00:00",
        "distance": 3200,
        "calories": 150
    });

    let activity = normalize("oura", &raw).unwrap();
    assert_eq!(activity.activity_type, ActivityType::Walk);
    assert_eq!(activity.duration_seconds, 40 * 60);
}

#[test]
fn test_manual_entry() {
    let raw = json!({
        "id": "m-5",
        "activity_type": "strength",
        "started_at": "2024-01-15T19:00:00Z",
        "duration_minutes": 50
    });

    let activity = normalize("manual", &raw).unwrap();
    assert_eq!(activity.activity_type, ActivityType::Strength);
    assert_eq!(activity.duration_seconds, 3000);
    assert_eq!(activity.distance_meters, 0.0);
}

#[test]
fn test_rejections() {
    let no_start = json!({"id": 1, "type": "Run", "moving_time": 1800});
    assert_eq!(
        normalize("strava", &no_start).unwrap_err(),
        NormalizationError::MissingStartTime {
            provider: "strava".to_string()
        }
    );

    let err = normalize("polar", &json!({"start_date": "2024-01-15T08:00:00Z"})).unwrap_err();
    assert_eq!(err, NormalizationError::UnknownSource("polar".to_string()));
}

#[test]
fn test_normalization_is_pure() {
    let raw = json!({
        "id": 1,
        "type": "Ride",
        "start_date": "2024-01-15T08:00:00Z",
        "moving_time": 3600,
        "distance": 30000
    });
    let snapshot = raw.clone();

    let first = normalize("strava", &raw).unwrap();
    let second = normalize("strava", &raw).unwrap();
    assert_eq!(first, second);
    assert_eq!(raw, snapshot);
}

#[test]
fn test_health_connect_sleep_stages() {
    let start = Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap();
    let raw = json!({
        "metadata": {"id": "hc-sleep-3"},
        "startTime": start.timestamp_millis(),
        "endTime": start.timestamp_millis() + 8 * 3_600_000,
        "stageMinutes": {"deep": 80, "rem": 95, "light": 250, "awake": 35}
    });

    let sleep = normalize_sleep("health_connect", &raw).unwrap();
    assert_eq!(sleep.original_id, "hc-sleep-3");
    assert_eq!(sleep.total_sleep_seconds, (80 + 95 + 250) * 60);
    assert_eq!(sleep.awake_seconds, 35 * 60);
    assert_eq!(sleep.duration_seconds(), 8 * 3600);
}
