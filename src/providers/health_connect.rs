// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Health Connect `ExerciseSessionRecord` and `SleepSessionRecord` payloads.
//!
//! Sessions carry no duration of their own; the normalizer derives it from
//! `startTime`/`endTime`. The bridge serializes instants either as ISO-8601
//! strings or as epoch milliseconds, and attaches aggregated
//! `totalDistance` (meters) and `totalEnergyBurned` (kilocalories).

use super::{
    keys, type_table, ActivityField, FieldMapping, SleepField, SleepMapping, SourceMapping,
    TimestampField, Unit,
};
use crate::constants::sources;
use crate::models::ActivityType;

pub fn activity_mapping() -> SourceMapping {
    SourceMapping {
        source: sources::HEALTH_CONNECT.to_string(),
        id_fields: keys(&["metadata.id", "id"]),
        start_time: vec![TimestampField::millis("startTime")],
        end_time: vec![TimestampField::millis("endTime")],
        fields: vec![
            FieldMapping::new("totalDistance", ActivityField::Distance, Unit::Meters),
            FieldMapping::new("totalEnergyBurned", ActivityField::Calories, Unit::Kilocalories),
            FieldMapping::new("activeCaloriesBurned", ActivityField::Calories, Unit::Kilocalories),
        ],
        activity_type_fields: keys(&["exerciseType"]),
        activity_types: type_table(&[
            ("EXERCISE_TYPE_RUNNING", ActivityType::Run),
            ("EXERCISE_TYPE_RUNNING_TREADMILL", ActivityType::Run),
            ("EXERCISE_TYPE_BIKING", ActivityType::Cycle),
            ("EXERCISE_TYPE_BIKING_STATIONARY", ActivityType::Cycle),
            ("EXERCISE_TYPE_WALKING", ActivityType::Walk),
            ("EXERCISE_TYPE_HIKING", ActivityType::Walk),
            ("EXERCISE_TYPE_SWIMMING_POOL", ActivityType::Swim),
            ("EXERCISE_TYPE_SWIMMING_OPEN_WATER", ActivityType::Swim),
            ("EXERCISE_TYPE_STRENGTH_TRAINING", ActivityType::Strength),
            ("EXERCISE_TYPE_WEIGHTLIFTING", ActivityType::Strength),
            // ExerciseSessionRecord integer constants
            ("56", ActivityType::Run),
            ("57", ActivityType::Run),
            ("8", ActivityType::Cycle),
            ("9", ActivityType::Cycle),
            ("79", ActivityType::Walk),
            ("37", ActivityType::Walk),
            ("74", ActivityType::Swim),
            ("73", ActivityType::Swim),
            ("70", ActivityType::Strength),
            ("81", ActivityType::Strength),
        ]),
    }
}

/// Sleep sessions with stage totals pre-aggregated by the bridge, in minutes
pub fn sleep_mapping() -> SleepMapping {
    SleepMapping {
        source: sources::HEALTH_CONNECT.to_string(),
        id_fields: keys(&["metadata.id", "id"]),
        start_time: vec![TimestampField::millis("startTime")],
        end_time: vec![TimestampField::millis("endTime")],
        fields: vec![
            FieldMapping::new("stageMinutes.sleeping", SleepField::TotalSleep, Unit::Minutes),
            FieldMapping::new("stageMinutes.deep", SleepField::DeepSleep, Unit::Minutes),
            FieldMapping::new("stageMinutes.rem", SleepField::RemSleep, Unit::Minutes),
            FieldMapping::new("stageMinutes.light", SleepField::LightSleep, Unit::Minutes),
            FieldMapping::new("stageMinutes.awake", SleepField::Awake, Unit::Minutes),
        ],
    }
}
