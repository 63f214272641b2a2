// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Normalizer
//!
//! Pure mapping from a `(source, raw payload)` pair to a [`UnifiedActivity`]
//! or [`UnifiedSleepRecord`], driven entirely by the tables in a
//! [`MappingRegistry`].
//!
//! Only two conditions are errors: an unregistered source and a payload with
//! no parseable start time. Every other missing or malformed value degrades to
//! zero (numbers) or [`ActivityType::Unknown`] (activity type).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

use crate::models::{offset, ActivityType, RawActivityRecord, UnifiedActivity, UnifiedSleepRecord};
use crate::providers::{
    ActivityField, EpochUnit, FieldMapping, MappingRegistry, SleepField, SleepMapping,
    SourceMapping, TimestampField, UnifiedField,
};

/// Reasons a raw record cannot be normalized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    /// The source key has no registered mapping table
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// The payload has no resolvable start time
    #[error("Record from {provider} has no parseable start time")]
    MissingStartTime { provider: String },
}

/// Table-driven normalizer for provider payloads
#[derive(Debug, Clone)]
pub struct Normalizer {
    registry: MappingRegistry,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(MappingRegistry::with_defaults())
    }
}

impl Normalizer {
    pub fn new(registry: MappingRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    /// Normalize one raw activity payload from `source`
    pub fn normalize(&self, source: &str, raw: &Value) -> Result<UnifiedActivity, NormalizationError> {
        let mapping = self
            .registry
            .activity_mapping(source)
            .ok_or_else(|| NormalizationError::UnknownSource(source.to_string()))?;

        match raw {
            Value::Object(payload) => Self::map_activity(mapping, payload),
            _ => Err(NormalizationError::MissingStartTime {
                provider: source.to_string(),
            }),
        }
    }

    pub fn normalize_record(
        &self,
        record: &RawActivityRecord,
    ) -> Result<UnifiedActivity, NormalizationError> {
        let mapping = self
            .registry
            .activity_mapping(&record.source)
            .ok_or_else(|| NormalizationError::UnknownSource(record.source.clone()))?;

        Self::map_activity(mapping, &record.payload)
    }

    /// Normalize one raw sleep payload from `source`
    pub fn normalize_sleep(
        &self,
        source: &str,
        raw: &Value,
    ) -> Result<UnifiedSleepRecord, NormalizationError> {
        let mapping = self
            .registry
            .sleep_mapping(source)
            .ok_or_else(|| NormalizationError::UnknownSource(source.to_string()))?;

        match raw {
            Value::Object(payload) => Self::map_sleep(mapping, payload),
            _ => Err(NormalizationError::MissingStartTime {
                provider: source.to_string(),
            }),
        }
    }

    pub fn normalize_sleep_record(
        &self,
        record: &RawActivityRecord,
    ) -> Result<UnifiedSleepRecord, NormalizationError> {
        let mapping = self
            .registry
            .sleep_mapping(&record.source)
            .ok_or_else(|| NormalizationError::UnknownSource(record.source.clone()))?;

        Self::map_sleep(mapping, &record.payload)
    }

    fn map_activity(
        mapping: &SourceMapping,
        payload: &Map<String, Value>,
    ) -> Result<UnifiedActivity, NormalizationError> {
        let start_time = read_timestamp(payload, &mapping.start_time).ok_or_else(|| {
            NormalizationError::MissingStartTime {
                provider: mapping.source.clone(),
            }
        })?;

        let duration_seconds = match read_field(payload, &mapping.fields, ActivityField::Duration) {
            Some(value) => clamp_seconds(value),
            None => read_timestamp(payload, &mapping.end_time)
                .map(|end| u64::try_from((end - start_time).num_seconds()).unwrap_or(0))
                .unwrap_or(0),
        };

        let distance_meters = read_field(payload, &mapping.fields, ActivityField::Distance)
            .map(clamp_non_negative)
            .unwrap_or(0.0);
        let calories = read_field(payload, &mapping.fields, ActivityField::Calories)
            .map(clamp_non_negative)
            .unwrap_or(0.0);

        Ok(UnifiedActivity {
            source: mapping.source.clone(),
            original_id: read_id(payload, &mapping.id_fields),
            activity_type: read_activity_type(mapping, payload),
            start_time,
            duration_seconds,
            distance_meters,
            calories,
        })
    }

    fn map_sleep(
        mapping: &SleepMapping,
        payload: &Map<String, Value>,
    ) -> Result<UnifiedSleepRecord, NormalizationError> {
        let start_time = read_timestamp(payload, &mapping.start_time).ok_or_else(|| {
            NormalizationError::MissingStartTime {
                provider: mapping.source.clone(),
            }
        })?;

        let seconds_of = |field| read_field(payload, &mapping.fields, field).map(clamp_seconds);
        let time_in_bed = seconds_of(SleepField::TimeInBed);
        let deep = seconds_of(SleepField::DeepSleep).unwrap_or(0);
        let rem = seconds_of(SleepField::RemSleep).unwrap_or(0);
        let light = seconds_of(SleepField::LightSleep).unwrap_or(0);
        let awake = seconds_of(SleepField::Awake).unwrap_or(0);
        let total_sleep = seconds_of(SleepField::TotalSleep)
            .filter(|total| *total > 0)
            .unwrap_or_else(|| deep.saturating_add(rem).saturating_add(light));

        let end_time = read_timestamp(payload, &mapping.end_time)
            .or_else(|| time_in_bed.map(|secs| offset(start_time, secs)))
            .unwrap_or_else(|| offset(start_time, total_sleep))
            .max(start_time);

        let in_bed = time_in_bed
            .filter(|secs| *secs > 0)
            .unwrap_or_else(|| u64::try_from((end_time - start_time).num_seconds()).unwrap_or(0));
        let efficiency = match read_field(payload, &mapping.fields, SleepField::Efficiency) {
            Some(value) => clamp_non_negative(value).min(100.0),
            None if in_bed > 0 && total_sleep > 0 => {
                (total_sleep as f64 / in_bed as f64 * 100.0).min(100.0)
            }
            None => 0.0,
        };

        Ok(UnifiedSleepRecord {
            source: mapping.source.clone(),
            original_id: read_id(payload, &mapping.id_fields),
            start_time,
            end_time,
            total_sleep_seconds: total_sleep,
            deep_sleep_seconds: deep,
            rem_sleep_seconds: rem,
            light_sleep_seconds: light,
            awake_seconds: awake,
            efficiency,
        })
    }
}

/// Normalize with the built-in provider tables
pub fn normalize(source: &str, raw: &Value) -> Result<UnifiedActivity, NormalizationError> {
    default_normalizer().normalize(source, raw)
}

/// Normalize a sleep payload with the built-in provider tables
pub fn normalize_sleep(source: &str, raw: &Value) -> Result<UnifiedSleepRecord, NormalizationError> {
    default_normalizer().normalize_sleep(source, raw)
}

fn default_normalizer() -> &'static Normalizer {
    static DEFAULT: OnceLock<Normalizer> = OnceLock::new();
    DEFAULT.get_or_init(Normalizer::default)
}

/// Resolve a key, falling back to a dotted path through nested objects
fn lookup<'a>(payload: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = payload.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let mut current = payload.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn read_field<F: UnifiedField>(
    payload: &Map<String, Value>,
    fields: &[FieldMapping<F>],
    target: F,
) -> Option<f64> {
    fields
        .iter()
        .filter(|mapping| mapping.field == target)
        .find_map(|mapping| {
            let value = coerce_number(lookup(payload, &mapping.key)?)?;
            let label = mapping
                .unit_key
                .as_deref()
                .and_then(|key| lookup(payload, key))
                .and_then(Value::as_str);
            Some(mapping.effective_unit(label).to_unified(value))
        })
}

fn read_timestamp(payload: &Map<String, Value>, fields: &[TimestampField]) -> Option<DateTime<Utc>> {
    fields
        .iter()
        .find_map(|field| parse_timestamp(lookup(payload, &field.key)?, field.epoch_unit))
}

fn parse_timestamp(value: &Value, epoch_unit: EpochUnit) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => from_epoch(n.as_f64()?, epoch_unit),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
                return Some(parsed.with_timezone(&Utc));
            }
            if let Ok(parsed) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
                return Some(parsed.with_timezone(&Utc));
            }
            // Naive wall-clock times carry no offset and are read as UTC
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(parsed) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(parsed.and_utc());
                }
            }
            from_epoch(s.parse::<f64>().ok()?, epoch_unit)
        }
        _ => None,
    }
}

fn from_epoch(value: f64, epoch_unit: EpochUnit) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = match epoch_unit {
        EpochUnit::Seconds => value * 1_000.0,
        EpochUnit::Milliseconds => value,
    };
    DateTime::from_timestamp_millis(millis as i64)
}

fn read_id(payload: &Map<String, Value>, id_fields: &[String]) -> String {
    id_fields
        .iter()
        .find_map(|key| match lookup(payload, key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// First activity-type field whose value maps into the taxonomy
fn read_activity_type(mapping: &SourceMapping, payload: &Map<String, Value>) -> ActivityType {
    let mut unmapped = None;
    for key in &mapping.activity_type_fields {
        let provider_type = match lookup(payload, key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        match mapping.map_activity_type(&provider_type) {
            ActivityType::Unknown => unmapped = unmapped.or(Some(provider_type)),
            kind => return kind,
        }
    }
    if let Some(provider_type) = unmapped {
        debug!(
            source = %mapping.source,
            provider_type = %provider_type,
            "Unmapped activity type, using unknown"
        );
    }
    ActivityType::Unknown
}

fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn clamp_seconds(value: f64) -> u64 {
    // `as` saturates at u64::MAX
    clamp_non_negative(value).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{type_table, Unit};
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_strava_units_pass_through() {
        let raw = json!({
            "id": 1001,
            "type": "Run",
            "start_date": "2024-01-15T08:00:00Z",
            "moving_time": 1800,
            "elapsed_time": 1900,
            "distance": 5000
        });

        let activity = normalize("strava", &raw).expect("strava record should normalize");
        assert_eq!(activity.duration_seconds, 1800);
        assert_eq!(activity.distance_meters, 5000.0);
        assert_eq!(activity.calories, 0.0);
        assert_eq!(activity.original_id, "1001");
        assert_eq!(activity.activity_type, ActivityType::Run);
        assert_eq!(
            activity.start_time,
            Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unknown_activity_type_falls_back() {
        let raw = json!({
            "type": "ParaGliding",
            "moving_time": 10,
            "distance": 0,
            "start_date": "2024-01-15T08:00:00Z"
        });

        let activity = normalize("strava", &raw).expect("unmapped type is not an error");
        assert_eq!(activity.activity_type, ActivityType::Unknown);
    }

    #[test]
    fn test_sport_type_preferred_over_type() {
        let raw = json!({
            "sport_type": "GravelRide",
            "type": "Run",
            "start_date": "2024-01-15T08:00:00Z"
        });
        assert_eq!(normalize("strava", &raw).unwrap().activity_type, ActivityType::Cycle);

        let raw = json!({
            "sport_type": "Pickleball",
            "type": "Walk",
            "start_date": "2024-01-15T08:00:00Z"
        });
        assert_eq!(normalize("strava", &raw).unwrap().activity_type, ActivityType::Walk);
    }

    #[test]
    fn test_missing_start_time_rejected() {
        let err = normalize("apple_health", &json!({"duration": 100})).unwrap_err();
        assert_eq!(
            err,
            NormalizationError::MissingStartTime {
                provider: "apple_health".to_string()
            }
        );

        let err = normalize("apple_health", &json!({"startDate": "yesterday"})).unwrap_err();
        assert!(matches!(err, NormalizationError::MissingStartTime { .. }));
    }

    #[test]
    fn test_unknown_source_rejected() {
        let err = normalize("garmin", &json!({"start_date": "2024-01-15T08:00:00Z"})).unwrap_err();
        assert_eq!(err, NormalizationError::UnknownSource("garmin".to_string()));
        assert_eq!(err.to_string(), "Unknown source: garmin");
    }

    #[test]
    fn test_non_object_payload_has_no_start_time() {
        let err = normalize("strava", &json!("2024-01-15T08:00:00Z")).unwrap_err();
        assert!(matches!(err, NormalizationError::MissingStartTime { .. }));
    }

    #[test]
    fn test_negative_and_malformed_values_clamped() {
        let raw = json!({
            "start_date": "2024-01-15T08:00:00Z",
            "moving_time": -30,
            "distance": "not a number",
            "calories": -12.5
        });

        let activity = normalize("strava", &raw).unwrap();
        assert_eq!(activity.duration_seconds, 0);
        assert_eq!(activity.distance_meters, 0.0);
        assert_eq!(activity.calories, 0.0);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let raw = json!({
            "start_date": "2024-01-15T08:00:00Z",
            "moving_time": "1800",
            "distance": " 5000.5 "
        });

        let activity = normalize("strava", &raw).unwrap();
        assert_eq!(activity.duration_seconds, 1800);
        assert_eq!(activity.distance_meters, 5000.5);
    }

    #[test]
    fn test_fallback_duration_candidate() {
        let raw = json!({
            "start_date": "2024-01-15T08:00:00Z",
            "elapsed_time": 2400
        });
        assert_eq!(normalize("strava", &raw).unwrap().duration_seconds, 2400);
    }

    #[test]
    fn test_offset_timestamps_converted_to_utc() {
        let raw = json!({
            "logId": 555,
            "activityName": "Walk",
            "startTime": "2024-01-15T10:00:00.000-08:00",
            "duration": 1_800_000
        });

        let activity = normalize("fitbit", &raw).unwrap();
        assert_eq!(
            activity.start_time,
            Utc.with_ymd_and_hms(2024, 1, 15, 18, 0, 0).unwrap()
        );
        assert_eq!(activity.duration_seconds, 1800);
        assert_eq!(activity.activity_type, ActivityType::Walk);
    }

    #[test]
    fn test_epoch_millis_timestamps() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let raw = json!({
            "metadata": {"id": "hc-1"},
            "exerciseType": 56,
            "startTime": start.timestamp_millis(),
            "endTime": start.timestamp_millis() + 1_800_000
        });

        let activity = normalize("health_connect", &raw).unwrap();
        assert_eq!(activity.start_time, start);
        assert_eq!(activity.duration_seconds, 1800);
        assert_eq!(activity.original_id, "hc-1");
        assert_eq!(activity.activity_type, ActivityType::Run);
    }

    #[test]
    fn test_end_before_start_yields_zero_duration() {
        let raw = json!({
            "id": "w-1",
            "activity": "running",
            "start_datetime": "2024-01-15T09:00:00+00:00",
            "end_datetime": "2024-01-15T08:00:00+00:00"
        });

        assert_eq!(normalize("oura", &raw).unwrap().duration_seconds, 0);
    }

    #[test]
    fn test_injected_fixture_registry() {
        let mut registry = MappingRegistry::empty();
        registry.register(SourceMapping {
            source: "fixture".to_string(),
            id_fields: vec!["ref".to_string()],
            start_time: vec![TimestampField::seconds("at")],
            end_time: vec![],
            fields: vec![FieldMapping::new("yards", ActivityField::Distance, Unit::Yards)],
            activity_type_fields: vec!["kind".to_string()],
            activity_types: type_table(&[("laps", ActivityType::Swim)]),
        });
        let normalizer = Normalizer::new(registry);

        let activity = normalizer
            .normalize("fixture", &json!({"ref": "x", "at": 1_705_305_600, "yards": 100, "kind": "laps"}))
            .unwrap();
        assert_eq!(activity.activity_type, ActivityType::Swim);
        assert!((activity.distance_meters - 91.44).abs() < 1e-9);
        assert_eq!(
            activity.start_time,
            Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
        );
        assert!(normalizer.normalize("strava", &json!({})).is_err());
    }

    #[test]
    fn test_normalize_record_uses_record_source() {
        let record = RawActivityRecord::new(
            "manual",
            json!({"id": 7, "type": "run", "start_time": "2024-01-15 06:30:00", "duration_minutes": 45, "distance_km": 8}),
        );

        let activity = Normalizer::default().normalize_record(&record).unwrap();
        assert_eq!(activity.source, "manual");
        assert_eq!(activity.duration_seconds, 2700);
        assert_eq!(activity.distance_meters, 8000.0);
        assert_eq!(
            activity.start_time,
            Utc.with_ymd_and_hms(2024, 1, 15, 6, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_sleep_end_derived_from_time_in_bed() {
        let raw = json!({
            "logId": 42,
            "startTime": "2024-01-14T23:00:00.000",
            "duration": 28_800_000,
            "minutesAsleep": 420,
            "levels": {"summary": {"deep": {"minutes": 90}, "rem": {"minutes": 100}, "light": {"minutes": 230}}}
        });

        let sleep = normalize_sleep("fitbit", &raw).unwrap();
        assert_eq!(sleep.end_time, Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap());
        assert_eq!(sleep.total_sleep_seconds, 420 * 60);
        assert_eq!(sleep.deep_sleep_seconds, 90 * 60);
        assert!((sleep.efficiency - 87.5).abs() < 1e-9);
    }

    #[test]
    fn test_sleep_total_from_stages_when_absent() {
        let raw = json!({
            "id": "s-1",
            "bedtime_start": "2024-01-14T22:30:00+00:00",
            "bedtime_end": "2024-01-15T06:30:00+00:00",
            "deep_sleep_duration": 3600,
            "rem_sleep_duration": 5400,
            "light_sleep_duration": 14400,
            "efficiency": 140
        });

        let sleep = normalize_sleep("oura", &raw).unwrap();
        assert_eq!(sleep.total_sleep_seconds, 23400);
        assert_eq!(sleep.efficiency, 100.0);
        assert_eq!(sleep.duration_seconds(), 8 * 3600);
    }

    #[test]
    fn test_sleep_without_mapping_is_unknown_source() {
        let err = normalize_sleep("strava", &json!({"start_date": "2024-01-15T08:00:00Z"})).unwrap_err();
        assert_eq!(err, NormalizationError::UnknownSource("strava".to_string()));
    }
}
