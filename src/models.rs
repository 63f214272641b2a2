// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! This module contains the core data structures produced and consumed by the
//! reconciliation engine. Provider payloads arrive as [`RawActivityRecord`]s
//! and leave the normalizer as fully typed [`UnifiedActivity`] or
//! [`UnifiedSleepRecord`] values.
//!
//! ## Design Principles
//!
//! - **Provider Agnostic**: Unified models carry no provider-specific field names or units
//! - **Total**: Numeric fields are never null; absent values are zero
//! - **Serializable**: All models support JSON serialization for the persistence layer
//! - **Closed Taxonomy**: [`ActivityType`] never carries a provider-native string
//!
//! ## Core Models
//!
//! - [`RawActivityRecord`]: A provider-native payload tagged with its source
//! - [`UnifiedActivity`]: A normalized workout/activity event
//! - [`UnifiedSleepRecord`]: A normalized sleep session
//! - [`ActivityType`]: Closed enumeration of supported activity types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// A provider-native payload describing one workout or health event
///
/// Produced by the per-provider sync clients and consumed immediately by the
/// normalizer. Field names and units inside `payload` are source-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawActivityRecord {
    /// Provider key (`strava`, `apple_health`, `health_connect`, `fitbit`, `oura`, `manual`)
    pub source: String,
    /// Arbitrary key-value payload as returned by the provider
    pub payload: Map<String, Value>,
}

impl RawActivityRecord {
    /// Build a record from a provider key and a JSON value.
    ///
    /// Non-object values produce an empty payload, which the normalizer
    /// rejects for lack of a start time.
    pub fn new(source: impl Into<String>, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            source: source.into(),
            payload,
        }
    }
}

/// Represents a single normalized activity from any provider
///
/// # Examples
///
/// ```rust
/// use health_reconciler::models::{ActivityType, UnifiedActivity};
/// use chrono::{TimeZone, Utc};
///
/// let activity = UnifiedActivity {
///     source: "strava".to_string(),
///     original_id: "12345".to_string(),
///     activity_type: ActivityType::Run,
///     start_time: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
///     duration_seconds: 1800, // 30 minutes
///     distance_meters: 5000.0, // 5km
///     calories: 0.0, // not reported
/// };
///
/// assert_eq!(activity.end_time(), Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap());
/// assert_eq!(activity.completeness(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedActivity {
    /// Source provider of this activity
    pub source: String,
    /// Provider-native identifier, stringified
    pub original_id: String,
    /// Type of activity, always from the closed taxonomy
    pub activity_type: ActivityType,
    /// When the activity started (UTC)
    pub start_time: DateTime<Utc>,
    /// Total duration of the activity in seconds
    pub duration_seconds: u64,
    /// Total distance covered in meters (0.0 when not reported)
    pub distance_meters: f64,
    /// Energy expenditure in kilocalories (0.0 when not reported)
    pub calories: f64,
}

impl UnifiedActivity {
    /// End of the activity's time interval
    pub fn end_time(&self) -> DateTime<Utc> {
        offset(self.start_time, self.duration_seconds)
    }

    /// Number of populated fields, used to break priority ties
    pub fn completeness(&self) -> u8 {
        let mut score = 0;
        if self.activity_type != ActivityType::Unknown {
            score += 1;
        }
        if self.duration_seconds > 0 {
            score += 1;
        }
        if self.distance_meters > 0.0 {
            score += 1;
        }
        if self.calories > 0.0 {
            score += 1;
        }
        score
    }

    /// Stable key for idempotent re-ingestion of this provider record.
    ///
    /// Records without a provider id are keyed by start time and type instead.
    pub fn ingestion_key(&self) -> String {
        if self.original_id.is_empty() {
            let start = self.start_time.to_rfc3339();
            return ingestion_key(&[&self.source, "", &start, self.activity_type.internal_name()]);
        }
        ingestion_key(&[&self.source, &self.original_id])
    }
}

/// Closed enumeration of supported activity types
///
/// Provider activity types that have no mapping fall back to `Unknown`;
/// a new provider subtype never breaks ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Running, including treadmill and trail runs
    Run,
    /// Cycling of any kind
    Cycle,
    /// Walking and hiking
    Walk,
    /// Pool and open water swimming
    Swim,
    /// Weight and strength training
    Strength,
    /// Anything the mapping tables do not cover
    Unknown,
}

impl ActivityType {
    /// Create ActivityType from its lowercase configuration name
    pub fn from_internal_string(internal_name: &str) -> Self {
        match internal_name.trim().to_ascii_lowercase().as_str() {
            "run" => ActivityType::Run,
            "cycle" => ActivityType::Cycle,
            "walk" => ActivityType::Walk,
            "swim" => ActivityType::Swim,
            "strength" => ActivityType::Strength,
            _ => ActivityType::Unknown,
        }
    }

    /// Lowercase name, the inverse of [`ActivityType::from_internal_string`]
    pub fn internal_name(&self) -> &'static str {
        match self {
            ActivityType::Run => "run",
            ActivityType::Cycle => "cycle",
            ActivityType::Walk => "walk",
            ActivityType::Swim => "swim",
            ActivityType::Strength => "strength",
            ActivityType::Unknown => "unknown",
        }
    }

    /// Get the human-readable name for this activity type
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityType::Run => "run",
            ActivityType::Cycle => "bike ride",
            ActivityType::Walk => "walk",
            ActivityType::Swim => "swim",
            ActivityType::Strength => "strength training",
            ActivityType::Unknown => "activity",
        }
    }
}

/// Represents a normalized sleep session from any provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSleepRecord {
    /// Source provider of this sleep session
    pub source: String,
    /// Provider-native identifier, stringified
    pub original_id: String,
    /// Bedtime start (UTC)
    pub start_time: DateTime<Utc>,
    /// Bedtime end (UTC), never before `start_time`
    pub end_time: DateTime<Utc>,
    /// Time actually asleep in seconds
    pub total_sleep_seconds: u64,
    /// Deep sleep in seconds
    pub deep_sleep_seconds: u64,
    /// REM sleep in seconds
    pub rem_sleep_seconds: u64,
    /// Light sleep in seconds
    pub light_sleep_seconds: u64,
    /// Time awake in bed in seconds
    pub awake_seconds: u64,
    /// Sleep efficiency percentage (0-100)
    pub efficiency: f64,
}

impl UnifiedSleepRecord {
    /// Time in bed in seconds
    pub fn duration_seconds(&self) -> u64 {
        u64::try_from((self.end_time - self.start_time).num_seconds()).unwrap_or(0)
    }

    /// Number of populated fields, used to break priority ties
    pub fn completeness(&self) -> u8 {
        [
            self.total_sleep_seconds,
            self.deep_sleep_seconds,
            self.rem_sleep_seconds,
            self.light_sleep_seconds,
            self.awake_seconds,
        ]
        .iter()
        .filter(|v| **v > 0)
        .count() as u8
            + u8::from(self.efficiency > 0.0)
    }

    /// Stable key for idempotent re-ingestion; id-less sessions use their bounds
    pub fn ingestion_key(&self) -> String {
        if self.original_id.is_empty() {
            let start = self.start_time.to_rfc3339();
            let end = self.end_time.to_rfc3339();
            return ingestion_key(&[&self.source, "", &start, &end]);
        }
        ingestion_key(&[&self.source, &self.original_id])
    }
}

/// Hex SHA-256 of the `:`-joined parts
fn ingestion_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parts.join(":").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `start + secs`, saturating at the largest representable instant
pub(crate) fn offset(start: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
