// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Activities entered by hand in the app.

use super::{keys, type_table, ActivityField, FieldMapping, SourceMapping, TimestampField, Unit};
use crate::constants::sources;
use crate::models::ActivityType;

pub fn activity_mapping() -> SourceMapping {
    SourceMapping {
        source: sources::MANUAL.to_string(),
        id_fields: keys(&["id"]),
        start_time: vec![
            TimestampField::seconds("start_time"),
            TimestampField::seconds("started_at"),
        ],
        end_time: vec![TimestampField::seconds("end_time")],
        fields: vec![
            FieldMapping::new("duration_seconds", ActivityField::Duration, Unit::Seconds),
            FieldMapping::new("duration_minutes", ActivityField::Duration, Unit::Minutes),
            FieldMapping::new("distance_meters", ActivityField::Distance, Unit::Meters),
            FieldMapping::new("distance_km", ActivityField::Distance, Unit::Kilometers),
            FieldMapping::new("distance_miles", ActivityField::Distance, Unit::Miles),
            FieldMapping::new("calories", ActivityField::Calories, Unit::Kilocalories),
        ],
        activity_type_fields: keys(&["activity_type", "type"]),
        activity_types: type_table(&[
            ("run", ActivityType::Run),
            ("running", ActivityType::Run),
            ("cycle", ActivityType::Cycle),
            ("cycling", ActivityType::Cycle),
            ("ride", ActivityType::Cycle),
            ("bike", ActivityType::Cycle),
            ("walk", ActivityType::Walk),
            ("walking", ActivityType::Walk),
            ("hike", ActivityType::Walk),
            ("swim", ActivityType::Swim),
            ("swimming", ActivityType::Swim),
            ("strength", ActivityType::Strength),
            ("weights", ActivityType::Strength),
            ("lifting", ActivityType::Strength),
        ]),
    }
}
