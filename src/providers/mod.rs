// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-provider field mapping tables.
//!
//! Each provider module describes its payload as data: which keys hold the
//! identifier and timestamps, which keys feed each unified field and in what
//! unit, and how provider activity types map onto [`ActivityType`]. Adding a
//! provider means adding a table, never new control flow in the normalizer.

use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::constants::units;
use crate::models::ActivityType;

pub mod apple_health;
pub mod fitbit;
pub mod health_connect;
pub mod manual;
pub mod oura;
pub mod strava;

/// Physical dimension of a unit or unified field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Time,
    Length,
    Energy,
    Ratio,
}

/// Units found in provider payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Seconds,
    Milliseconds,
    Minutes,
    Hours,
    Meters,
    Kilometers,
    Miles,
    Yards,
    Feet,
    Kilocalories,
    Kilojoules,
    Percent,
}

impl Unit {
    /// Convert a value in this unit to the unified unit of its dimension
    /// (seconds, meters, kilocalories, percent)
    pub fn to_unified(self, value: f64) -> f64 {
        match self {
            Unit::Seconds | Unit::Meters | Unit::Kilocalories | Unit::Percent => value,
            Unit::Milliseconds => value / units::MILLIS_PER_SECOND,
            Unit::Minutes => value * units::SECONDS_PER_MINUTE,
            Unit::Hours => value * units::SECONDS_PER_HOUR,
            Unit::Kilometers => value * units::METERS_PER_KILOMETER,
            Unit::Miles => value * units::METERS_PER_MILE,
            Unit::Yards => value * units::METERS_PER_YARD,
            Unit::Feet => value * units::METERS_PER_FOOT,
            Unit::Kilojoules => value / units::KILOJOULES_PER_KILOCALORIE,
        }
    }

    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Seconds | Unit::Milliseconds | Unit::Minutes | Unit::Hours => Dimension::Time,
            Unit::Meters | Unit::Kilometers | Unit::Miles | Unit::Yards | Unit::Feet => {
                Dimension::Length
            }
            Unit::Kilocalories | Unit::Kilojoules => Dimension::Energy,
            Unit::Percent => Dimension::Ratio,
        }
    }

    /// Parse a unit label as providers spell it (`"Kilometer"`, `"mi"`, `"kcal"`, ...)
    pub fn from_label(label: &str) -> Option<Self> {
        let unit = match label.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Unit::Seconds,
            "ms" | "millisecond" | "milliseconds" => Unit::Milliseconds,
            "min" | "minute" | "minutes" => Unit::Minutes,
            "h" | "hr" | "hour" | "hours" => Unit::Hours,
            "m" | "meter" | "meters" | "metre" | "metres" => Unit::Meters,
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => Unit::Kilometers,
            "mi" | "mile" | "miles" => Unit::Miles,
            "yd" | "yard" | "yards" => Unit::Yards,
            "ft" | "foot" | "feet" => Unit::Feet,
            "kcal" | "cal" | "calorie" | "calories" | "kilocalorie" | "kilocalories" => {
                Unit::Kilocalories
            }
            "kj" | "kilojoule" | "kilojoules" => Unit::Kilojoules,
            "%" | "percent" => Unit::Percent,
            _ => return None,
        };
        Some(unit)
    }
}

/// A unified field a mapping can target
pub trait UnifiedField: Copy + PartialEq {
    fn dimension(self) -> Dimension;
}

/// Numeric activity fields fed by mapping tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityField {
    Duration,
    Distance,
    Calories,
}

impl UnifiedField for ActivityField {
    fn dimension(self) -> Dimension {
        match self {
            ActivityField::Duration => Dimension::Time,
            ActivityField::Distance => Dimension::Length,
            ActivityField::Calories => Dimension::Energy,
        }
    }
}

/// Numeric sleep fields fed by mapping tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepField {
    TimeInBed,
    TotalSleep,
    DeepSleep,
    RemSleep,
    LightSleep,
    Awake,
    Efficiency,
}

impl UnifiedField for SleepField {
    fn dimension(self) -> Dimension {
        match self {
            SleepField::Efficiency => Dimension::Ratio,
            _ => Dimension::Time,
        }
    }
}

/// One `source key -> unified field` entry
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping<F> {
    /// Payload key, dotted for nested objects (`levels.summary.deep.minutes`)
    pub key: String,
    pub field: F,
    /// Unit of the payload value
    pub unit: Unit,
    /// Payload key holding a unit label that overrides `unit` when recognized
    pub unit_key: Option<String>,
}

impl<F: UnifiedField> FieldMapping<F> {
    pub fn new(key: &str, field: F, unit: Unit) -> Self {
        Self {
            key: key.to_string(),
            field,
            unit,
            unit_key: None,
        }
    }

    pub fn with_unit_key(mut self, unit_key: &str) -> Self {
        self.unit_key = Some(unit_key.to_string());
        self
    }

    /// Resolve the effective unit given the label found in the payload
    pub fn effective_unit(&self, label: Option<&str>) -> Unit {
        label
            .and_then(Unit::from_label)
            .filter(|unit| unit.dimension() == self.field.dimension())
            .unwrap_or(self.unit)
    }
}

/// How numeric timestamps in a field are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochUnit {
    Seconds,
    Milliseconds,
}

/// A payload key holding a timestamp.
///
/// Strings are parsed as RFC 3339 / ISO-8601; numbers are epochs in `epoch_unit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampField {
    pub key: String,
    pub epoch_unit: EpochUnit,
}

impl TimestampField {
    pub fn seconds(key: &str) -> Self {
        Self {
            key: key.to_string(),
            epoch_unit: EpochUnit::Seconds,
        }
    }

    pub fn millis(key: &str) -> Self {
        Self {
            key: key.to_string(),
            epoch_unit: EpochUnit::Milliseconds,
        }
    }
}

/// Activity mapping table for one provider
#[derive(Debug, Clone)]
pub struct SourceMapping {
    pub source: String,
    /// Identifier candidates, first present wins
    pub id_fields: Vec<String>,
    pub start_time: Vec<TimestampField>,
    pub end_time: Vec<TimestampField>,
    /// Ordered candidates; the first present, parseable key per field wins
    pub fields: Vec<FieldMapping<ActivityField>>,
    pub activity_type_fields: Vec<String>,
    pub activity_types: HashMap<String, ActivityType>,
}

impl SourceMapping {
    /// Map a provider activity type, exact match first, then case-insensitive
    pub fn map_activity_type(&self, provider_type: &str) -> ActivityType {
        if let Some(kind) = self.activity_types.get(provider_type) {
            return *kind;
        }
        self.activity_types
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(provider_type))
            .map(|(_, kind)| *kind)
            .unwrap_or(ActivityType::Unknown)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_time.is_empty() {
            bail!("mapping for '{}' declares no start time field", self.source);
        }
        validate_fields(&self.source, &self.fields)
    }
}

/// Sleep mapping table for one provider
#[derive(Debug, Clone)]
pub struct SleepMapping {
    pub source: String,
    pub id_fields: Vec<String>,
    pub start_time: Vec<TimestampField>,
    pub end_time: Vec<TimestampField>,
    pub fields: Vec<FieldMapping<SleepField>>,
}

impl SleepMapping {
    pub fn validate(&self) -> Result<()> {
        if self.start_time.is_empty() {
            bail!("sleep mapping for '{}' declares no start time field", self.source);
        }
        validate_fields(&self.source, &self.fields)
    }
}

fn validate_fields<F: UnifiedField + std::fmt::Debug>(
    source: &str,
    fields: &[FieldMapping<F>],
) -> Result<()> {
    for mapping in fields {
        if mapping.unit.dimension() != mapping.field.dimension() {
            bail!(
                "mapping for '{}' converts '{}' with {:?} into {:?}",
                source,
                mapping.key,
                mapping.unit,
                mapping.field
            );
        }
    }
    Ok(())
}

/// Build a provider activity-type table from `(provider name, type)` pairs
pub(crate) fn type_table(entries: &[(&str, ActivityType)]) -> HashMap<String, ActivityType> {
    entries
        .iter()
        .map(|(name, kind)| (name.to_string(), *kind))
        .collect()
}

pub(crate) fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Immutable set of mapping tables owned by a normalizer
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    activities: HashMap<String, SourceMapping>,
    sleep: HashMap<String, SleepMapping>,
}

impl MappingRegistry {
    /// Registry with no providers, for fixture tables in tests
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider table
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(strava::activity_mapping());
        registry.register(apple_health::activity_mapping());
        registry.register(health_connect::activity_mapping());
        registry.register(fitbit::activity_mapping());
        registry.register(oura::activity_mapping());
        registry.register(manual::activity_mapping());

        registry.register_sleep(apple_health::sleep_mapping());
        registry.register_sleep(health_connect::sleep_mapping());
        registry.register_sleep(fitbit::sleep_mapping());
        registry.register_sleep(oura::sleep_mapping());
        registry
    }

    pub fn register(&mut self, mapping: SourceMapping) {
        self.activities.insert(mapping.source.clone(), mapping);
    }

    pub fn register_sleep(&mut self, mapping: SleepMapping) {
        self.sleep.insert(mapping.source.clone(), mapping);
    }

    pub fn activity_mapping(&self, source: &str) -> Option<&SourceMapping> {
        self.activities.get(source)
    }

    pub fn sleep_mapping(&self, source: &str) -> Option<&SleepMapping> {
        self.sleep.get(source)
    }

    /// Merge configured activity-type entries over a provider's table.
    ///
    /// Returns `false` when the provider has no activity mapping.
    pub fn override_activity_types(
        &mut self,
        source: &str,
        overrides: &HashMap<String, ActivityType>,
    ) -> bool {
        match self.activities.get_mut(source) {
            Some(mapping) => {
                mapping
                    .activity_types
                    .extend(overrides.iter().map(|(name, kind)| (name.clone(), *kind)));
                true
            }
            None => false,
        }
    }

    /// Provider keys with an activity mapping, sorted
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self.activities.keys().map(String::as_str).collect();
        sources.sort_unstable();
        sources
    }

    /// Check every table for unit/field dimension mismatches
    pub fn validate(&self) -> Result<()> {
        for mapping in self.activities.values() {
            mapping.validate()?;
        }
        for mapping in self.sleep.values() {
            mapping.validate()?;
        }
        Ok(())
    }
}
