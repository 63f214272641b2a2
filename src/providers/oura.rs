// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Oura API v2 `usercollection/workout` and `usercollection/sleep` documents.
//!
//! Workouts have no duration field; it is derived from `start_datetime` and
//! `end_datetime`. Sleep durations are seconds.

use super::{
    keys, type_table, ActivityField, FieldMapping, SleepField, SleepMapping, SourceMapping,
    TimestampField, Unit,
};
use crate::constants::sources;
use crate::models::ActivityType;

pub fn activity_mapping() -> SourceMapping {
    SourceMapping {
        source: sources::OURA.to_string(),
        id_fields: keys(&["id"]),
        start_time: vec![TimestampField::seconds("start_datetime")],
        end_time: vec![TimestampField::seconds("end_datetime")],
        fields: vec![
            FieldMapping::new("distance", ActivityField::Distance, Unit::Meters),
            FieldMapping::new("calories", ActivityField::Calories, Unit::Kilocalories),
        ],
        activity_type_fields: keys(&["activity"]),
        activity_types: type_table(&[
            ("running", ActivityType::Run),
            ("cycling", ActivityType::Cycle),
            ("walking", ActivityType::Walk),
            ("hiking", ActivityType::Walk),
            ("swimming", ActivityType::Swim),
            ("strength_training", ActivityType::Strength),
            ("weightlifting", ActivityType::Strength),
        ]),
    }
}

pub fn sleep_mapping() -> SleepMapping {
    SleepMapping {
        source: sources::OURA.to_string(),
        id_fields: keys(&["id"]),
        start_time: vec![TimestampField::seconds("bedtime_start")],
        end_time: vec![TimestampField::seconds("bedtime_end")],
        fields: vec![
            FieldMapping::new("time_in_bed", SleepField::TimeInBed, Unit::Seconds),
            FieldMapping::new("total_sleep_duration", SleepField::TotalSleep, Unit::Seconds),
            FieldMapping::new("deep_sleep_duration", SleepField::DeepSleep, Unit::Seconds),
            FieldMapping::new("rem_sleep_duration", SleepField::RemSleep, Unit::Seconds),
            FieldMapping::new("light_sleep_duration", SleepField::LightSleep, Unit::Seconds),
            FieldMapping::new("awake_time", SleepField::Awake, Unit::Seconds),
            FieldMapping::new("efficiency", SleepField::Efficiency, Unit::Percent),
        ],
    }
}
