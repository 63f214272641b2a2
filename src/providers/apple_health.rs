// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Apple Health payloads as emitted by the HealthKit bridge.
//!
//! The bridge forwards `HKWorkout` properties under their HealthKit names
//! (`startDate`, `duration` in seconds, `totalDistance` in meters,
//! `totalEnergyBurned` in kilocalories). Older bridge builds used the
//! snake_case `date_from`/`date_to` epoch-millisecond keys, which are still
//! accepted as fallbacks.

use super::{
    keys, type_table, ActivityField, FieldMapping, SleepField, SleepMapping, SourceMapping,
    TimestampField, Unit,
};
use crate::constants::sources;
use crate::models::ActivityType;

pub fn activity_mapping() -> SourceMapping {
    SourceMapping {
        source: sources::APPLE_HEALTH.to_string(),
        id_fields: keys(&["uuid", "id"]),
        start_time: vec![
            TimestampField::seconds("startDate"),
            TimestampField::millis("date_from"),
        ],
        end_time: vec![
            TimestampField::seconds("endDate"),
            TimestampField::millis("date_to"),
        ],
        fields: vec![
            FieldMapping::new("duration", ActivityField::Duration, Unit::Seconds),
            FieldMapping::new("totalDistance", ActivityField::Distance, Unit::Meters),
            FieldMapping::new("total_distance", ActivityField::Distance, Unit::Meters),
            FieldMapping::new("totalEnergyBurned", ActivityField::Calories, Unit::Kilocalories),
            FieldMapping::new("total_energy_burned", ActivityField::Calories, Unit::Kilocalories),
        ],
        activity_type_fields: keys(&["workoutActivityType", "workout_activity_type"]),
        activity_types: type_table(&[
            ("HKWorkoutActivityTypeRunning", ActivityType::Run),
            ("HKWorkoutActivityTypeCycling", ActivityType::Cycle),
            ("HKWorkoutActivityTypeHandCycling", ActivityType::Cycle),
            ("HKWorkoutActivityTypeWalking", ActivityType::Walk),
            ("HKWorkoutActivityTypeHiking", ActivityType::Walk),
            ("HKWorkoutActivityTypeSwimming", ActivityType::Swim),
            ("HKWorkoutActivityTypeTraditionalStrengthTraining", ActivityType::Strength),
            ("HKWorkoutActivityTypeFunctionalStrengthTraining", ActivityType::Strength),
            // HKWorkoutActivityType raw values
            ("37", ActivityType::Run),
            ("13", ActivityType::Cycle),
            ("52", ActivityType::Walk),
            ("24", ActivityType::Walk),
            ("46", ActivityType::Swim),
            ("50", ActivityType::Strength),
            ("20", ActivityType::Strength),
            // Names used by the older bridge
            ("RUNNING", ActivityType::Run),
            ("BIKING", ActivityType::Cycle),
            ("WALKING", ActivityType::Walk),
            ("HIKING", ActivityType::Walk),
            ("SWIMMING", ActivityType::Swim),
            ("TRADITIONAL_STRENGTH_TRAINING", ActivityType::Strength),
            ("FUNCTIONAL_STRENGTH_TRAINING", ActivityType::Strength),
        ]),
    }
}

/// Sleep analysis summaries aggregated by the bridge, all durations in seconds
pub fn sleep_mapping() -> SleepMapping {
    SleepMapping {
        source: sources::APPLE_HEALTH.to_string(),
        id_fields: keys(&["uuid", "id"]),
        start_time: vec![
            TimestampField::seconds("startDate"),
            TimestampField::millis("date_from"),
        ],
        end_time: vec![
            TimestampField::seconds("endDate"),
            TimestampField::millis("date_to"),
        ],
        fields: vec![
            FieldMapping::new("inBed", SleepField::TimeInBed, Unit::Seconds),
            FieldMapping::new("asleep", SleepField::TotalSleep, Unit::Seconds),
            FieldMapping::new("asleepDeep", SleepField::DeepSleep, Unit::Seconds),
            FieldMapping::new("asleepREM", SleepField::RemSleep, Unit::Seconds),
            FieldMapping::new("asleepCore", SleepField::LightSleep, Unit::Seconds),
            FieldMapping::new("awake", SleepField::Awake, Unit::Seconds),
        ],
    }
}
