// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fitbit Web API payloads.
//!
//! # API Documentation
//! - [Activity log list](https://dev.fitbit.com/build/reference/web-api/activity/get-activity-log-list/)
//! - [Sleep log](https://dev.fitbit.com/build/reference/web-api/sleep/get-sleep-log-by-date/)
//!
//! Durations are milliseconds. Distance follows the account's unit system and
//! is labelled by `distanceUnit` (`"Kilometer"` or `"Mile"`). Sleep log times
//! are local wall-clock times without an offset and are read as UTC.

use super::{
    keys, type_table, ActivityField, FieldMapping, SleepField, SleepMapping, SourceMapping,
    TimestampField, Unit,
};
use crate::constants::sources;
use crate::models::ActivityType;

pub fn activity_mapping() -> SourceMapping {
    SourceMapping {
        source: sources::FITBIT.to_string(),
        id_fields: keys(&["logId"]),
        start_time: vec![TimestampField::millis("startTime")],
        end_time: vec![],
        fields: vec![
            FieldMapping::new("duration", ActivityField::Duration, Unit::Milliseconds),
            FieldMapping::new("activeDuration", ActivityField::Duration, Unit::Milliseconds),
            FieldMapping::new("distance", ActivityField::Distance, Unit::Kilometers)
                .with_unit_key("distanceUnit"),
            FieldMapping::new("calories", ActivityField::Calories, Unit::Kilocalories),
        ],
        activity_type_fields: keys(&["activityName"]),
        activity_types: type_table(&[
            ("Run", ActivityType::Run),
            ("Running", ActivityType::Run),
            ("Treadmill", ActivityType::Run),
            ("Bike", ActivityType::Cycle),
            ("Outdoor Bike", ActivityType::Cycle),
            ("Spinning", ActivityType::Cycle),
            ("Walk", ActivityType::Walk),
            ("Hike", ActivityType::Walk),
            ("Swim", ActivityType::Swim),
            ("Swimming", ActivityType::Swim),
            ("Weights", ActivityType::Strength),
            ("Weight lifting", ActivityType::Strength),
            ("Strength training", ActivityType::Strength),
        ]),
    }
}

pub fn sleep_mapping() -> SleepMapping {
    SleepMapping {
        source: sources::FITBIT.to_string(),
        id_fields: keys(&["logId"]),
        start_time: vec![TimestampField::millis("startTime")],
        end_time: vec![TimestampField::millis("endTime")],
        fields: vec![
            FieldMapping::new("duration", SleepField::TimeInBed, Unit::Milliseconds),
            FieldMapping::new("minutesAsleep", SleepField::TotalSleep, Unit::Minutes),
            FieldMapping::new("minutesAwake", SleepField::Awake, Unit::Minutes),
            FieldMapping::new("levels.summary.deep.minutes", SleepField::DeepSleep, Unit::Minutes),
            FieldMapping::new("levels.summary.rem.minutes", SleepField::RemSleep, Unit::Minutes),
            FieldMapping::new("levels.summary.light.minutes", SleepField::LightSleep, Unit::Minutes),
            FieldMapping::new("efficiency", SleepField::Efficiency, Unit::Percent),
        ],
    }
}
