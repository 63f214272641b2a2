// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Strava activity payloads (`GET /athlete/activities`).
//!
//! Strava reports `moving_time`/`elapsed_time` in seconds, `distance` in
//! meters and `start_date` as UTC ISO-8601. `calories` is only present on the
//! detailed activity representation.

use super::{keys, type_table, ActivityField, FieldMapping, SourceMapping, TimestampField, Unit};
use crate::constants::sources;
use crate::models::ActivityType;

pub fn activity_mapping() -> SourceMapping {
    SourceMapping {
        source: sources::STRAVA.to_string(),
        id_fields: keys(&["id"]),
        start_time: vec![TimestampField::seconds("start_date")],
        end_time: vec![],
        fields: vec![
            FieldMapping::new("moving_time", ActivityField::Duration, Unit::Seconds),
            FieldMapping::new("elapsed_time", ActivityField::Duration, Unit::Seconds),
            FieldMapping::new("distance", ActivityField::Distance, Unit::Meters),
            FieldMapping::new("calories", ActivityField::Calories, Unit::Kilocalories),
        ],
        // `sport_type` is the newer, more specific field
        activity_type_fields: keys(&["sport_type", "type"]),
        activity_types: type_table(&[
            ("Run", ActivityType::Run),
            ("TrailRun", ActivityType::Run),
            ("VirtualRun", ActivityType::Run),
            ("Ride", ActivityType::Cycle),
            ("VirtualRide", ActivityType::Cycle),
            ("EBikeRide", ActivityType::Cycle),
            ("EMountainBikeRide", ActivityType::Cycle),
            ("MountainBikeRide", ActivityType::Cycle),
            ("GravelRide", ActivityType::Cycle),
            ("Handcycle", ActivityType::Cycle),
            ("Velomobile", ActivityType::Cycle),
            ("Walk", ActivityType::Walk),
            ("Hike", ActivityType::Walk),
            ("Swim", ActivityType::Swim),
            ("WeightTraining", ActivityType::Strength),
            ("Crossfit", ActivityType::Strength),
        ]),
    }
}
