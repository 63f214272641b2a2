// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Source-of-Truth Resolver
//!
//! Collapses records from different providers that describe the same
//! real-world event into one authoritative record.
//!
//! Records are sorted by start time and scanned left to right. The scan keeps
//! one open group whose effective interval is the union of every record it
//! has absorbed; a candidate joins the group when it overlaps that union
//! under the configured [`OverlapPolicy`]. Each group yields a single record:
//! the member with the highest source priority (then the most populated
//! fields, then the earliest), stretched to cover the group's union so that
//! resolving the output again changes nothing.
//!
//! Zero-width records (a weigh-in, a manual note) are scanned separately and
//! only collapse with other zero-width records at the same instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

use crate::constants::resolution;
use crate::models::{ActivityType, UnifiedActivity, UnifiedSleepRecord};

/// A record the resolver can deduplicate
pub trait Reconcilable: Clone {
    fn source(&self) -> &str;

    fn start_time(&self) -> DateTime<Utc>;

    fn end_time(&self) -> DateTime<Utc>;

    /// Number of populated fields, for tie-breaks between equal priorities
    fn completeness(&self) -> u8;

    /// Stretch the record over `[start, end]`
    fn set_interval(&mut self, start: DateTime<Utc>, end: DateTime<Utc>);

    /// Copy values this record lacks from a lower-ranked duplicate
    fn fill_missing_from(&mut self, other: &Self);
}

impl Reconcilable for UnifiedActivity {
    fn source(&self) -> &str {
        &self.source
    }

    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end_time(&self) -> DateTime<Utc> {
        UnifiedActivity::end_time(self)
    }

    fn completeness(&self) -> u8 {
        UnifiedActivity::completeness(self)
    }

    fn set_interval(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.start_time = start;
        // Truncating keeps the stored interval inside the union it came from
        self.duration_seconds = u64::try_from((end - start).num_seconds()).unwrap_or(0);
    }

    fn fill_missing_from(&mut self, other: &Self) {
        if self.activity_type == ActivityType::Unknown {
            self.activity_type = other.activity_type;
        }
        if self.distance_meters <= 0.0 {
            self.distance_meters = other.distance_meters;
        }
        if self.calories <= 0.0 {
            self.calories = other.calories;
        }
    }
}

impl Reconcilable for UnifiedSleepRecord {
    fn source(&self) -> &str {
        &self.source
    }

    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    fn completeness(&self) -> u8 {
        UnifiedSleepRecord::completeness(self)
    }

    fn set_interval(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.start_time = start;
        self.end_time = end.max(start);
    }

    fn fill_missing_from(&mut self, other: &Self) {
        let pairs = [
            (&mut self.total_sleep_seconds, other.total_sleep_seconds),
            (&mut self.deep_sleep_seconds, other.deep_sleep_seconds),
            (&mut self.rem_sleep_seconds, other.rem_sleep_seconds),
            (&mut self.light_sleep_seconds, other.light_sleep_seconds),
            (&mut self.awake_seconds, other.awake_seconds),
        ];
        for (mine, theirs) in pairs {
            if *mine == 0 {
                *mine = theirs;
            }
        }
        if self.efficiency <= 0.0 {
            self.efficiency = other.efficiency;
        }
    }
}

/// Closed time interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn of<T: Reconcilable>(record: &T) -> Self {
        Self::new(record.start_time(), record.end_time())
    }

    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    pub fn length_millis(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    /// Length of the intersection in milliseconds, 0 when disjoint
    pub fn intersection_millis(&self, other: &Interval) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start).num_milliseconds().max(0)
    }

    pub fn union(&self, other: &Interval) -> Interval {
        Interval::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// When two records are considered the same real-world event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Any intersection of positive length
    Intersection,
    /// Intersection covering at least `min_fraction` of the shorter interval
    ShorterFraction {
        #[serde(default = "default_min_fraction")]
        min_fraction: f64,
    },
}

fn default_min_fraction() -> f64 {
    resolution::DEFAULT_MIN_OVERLAP_FRACTION
}

impl Default for OverlapPolicy {
    fn default() -> Self {
        OverlapPolicy::ShorterFraction {
            min_fraction: resolution::DEFAULT_MIN_OVERLAP_FRACTION,
        }
    }
}

impl OverlapPolicy {
    /// Zero-width intervals only match another zero-width interval at the same instant
    pub fn overlaps(&self, a: &Interval, b: &Interval) -> bool {
        if a.is_point() || b.is_point() {
            return a.is_point() && b.is_point() && a.start == b.start;
        }

        let shared = a.intersection_millis(b);
        if shared <= 0 {
            return false;
        }

        match self {
            OverlapPolicy::Intersection => true,
            OverlapPolicy::ShorterFraction { min_fraction } => {
                let shorter = a.length_millis().min(b.length_millis());
                shared as f64 >= min_fraction * shorter as f64
            }
        }
    }
}

/// What the surviving record of a duplicate group carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// The winning record as reported by its source
    #[default]
    PreferHighestPriority,
    /// The winning record with its zero-valued fields filled from the others
    FillMissing,
}

impl MergeStrategy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "prefer_highest_priority" | "priority" => Some(MergeStrategy::PreferHighestPriority),
            "fill_missing" | "merge" => Some(MergeStrategy::FillMissing),
            _ => None,
        }
    }
}

/// Source priorities; sources missing from the table rank 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityTable(HashMap<String, i32>);

impl Default for PriorityTable {
    fn default() -> Self {
        Self(
            resolution::DEFAULT_PRIORITIES
                .iter()
                .map(|(source, priority)| (source.to_string(), *priority))
                .collect(),
        )
    }
}

impl PriorityTable {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn priority(&self, source: &str) -> i32 {
        self.0
            .get(source)
            .copied()
            .unwrap_or(resolution::UNRANKED_PRIORITY)
    }

    pub fn set(&mut self, source: &str, priority: i32) {
        self.0.insert(source.to_string(), priority);
    }

    pub fn extend(&mut self, overrides: &HashMap<String, i32>) {
        self.0
            .extend(overrides.iter().map(|(source, priority)| (source.clone(), *priority)));
    }
}

/// Resolver tuning
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolverConfig {
    pub priorities: PriorityTable,
    pub overlap: OverlapPolicy,
    pub merge: MergeStrategy,
}

/// Deduplicates normalized records across sources
#[derive(Debug, Clone, Default)]
pub struct SourceOfTruthResolver {
    config: ResolverConfig,
}

impl SourceOfTruthResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Deduplicated activities, sorted ascending by start time
    pub fn resolve_conflicts(&self, activities: Vec<UnifiedActivity>) -> Vec<UnifiedActivity> {
        self.resolve(activities)
    }

    /// Deduplicated sleep sessions, sorted ascending by start time
    pub fn resolve_sleep_conflicts(&self, sessions: Vec<UnifiedSleepRecord>) -> Vec<UnifiedSleepRecord> {
        self.resolve(sessions)
    }

    pub fn resolve<T: Reconcilable>(&self, records: Vec<T>) -> Vec<T> {
        // A zero-width record never overlaps a span, so it must not interrupt
        // the open span group; instants are grouped among themselves
        let (instants, spans): (Vec<T>, Vec<T>) = records
            .into_iter()
            .partition(|record| Interval::of(record).is_point());

        let mut resolved = self.scan(instants);
        resolved.extend(self.scan(spans));
        resolved.sort_by_key(|record| (record.start_time(), record.end_time()));
        resolved
    }

    /// Group overlapping records in one pass over `records` sorted by interval
    fn scan<T: Reconcilable>(&self, mut records: Vec<T>) -> Vec<T> {
        // Stable, so identical intervals keep input order for the final tie-break
        records.sort_by_key(|record| (record.start_time(), record.end_time()));

        let mut resolved = Vec::with_capacity(records.len());
        let mut remaining = records.into_iter();
        let Some(first) = remaining.next() else {
            return resolved;
        };

        let mut group = Group::new(first);
        for candidate in remaining {
            let interval = Interval::of(&candidate);
            if self.config.overlap.overlaps(&group.interval, &interval) {
                group.absorb(candidate, interval, &self.config.priorities);
            } else {
                resolved.push(group.finish(&self.config));
                group = Group::new(candidate);
            }
        }
        resolved.push(group.finish(&self.config));
        resolved
    }

    /// Whether `challenger` should replace `incumbent` as a group's source of truth
    fn outranks<T: Reconcilable>(priorities: &PriorityTable, challenger: &T, incumbent: &T) -> bool {
        let challenger_priority = priorities.priority(challenger.source());
        let incumbent_priority = priorities.priority(incumbent.source());
        challenger_priority > incumbent_priority
            || (challenger_priority == incumbent_priority
                && challenger.completeness() > incumbent.completeness())
    }
}

/// Records collapsed into one event, in scan order
struct Group<T> {
    members: Vec<T>,
    winner: usize,
    interval: Interval,
}

impl<T: Reconcilable> Group<T> {
    fn new(first: T) -> Self {
        let interval = Interval::of(&first);
        Self {
            members: vec![first],
            winner: 0,
            interval,
        }
    }

    fn absorb(&mut self, candidate: T, interval: Interval, priorities: &PriorityTable) {
        self.interval = self.interval.union(&interval);
        if SourceOfTruthResolver::outranks(priorities, &candidate, &self.members[self.winner]) {
            self.winner = self.members.len();
        }
        self.members.push(candidate);
    }

    fn finish(mut self, config: &ResolverConfig) -> T {
        if self.members.len() == 1 {
            return self.members.swap_remove(0);
        }

        let mut resolved = self.members.swap_remove(self.winner);
        debug!(
            source = %resolved.source(),
            duplicates = self.members.len(),
            start = %self.interval.start,
            end = %self.interval.end,
            "Collapsed overlapping records"
        );

        if config.merge == MergeStrategy::FillMissing {
            // swap_remove disturbed scan order; restore it before ranking the losers
            let mut losers = self.members;
            losers.sort_by_key(|record| (record.start_time(), record.end_time()));
            losers.sort_by_key(|record| Reverse(config.priorities.priority(record.source())));
            for loser in &losers {
                resolved.fill_missing_from(loser);
            }
        }

        resolved.set_interval(self.interval.start, self.interval.end);
        resolved
    }
}

/// Resolve with the default priority table and overlap policy
pub fn resolve_conflicts(activities: Vec<UnifiedActivity>) -> Vec<UnifiedActivity> {
    default_resolver().resolve_conflicts(activities)
}

/// Resolve sleep sessions with the default priority table and overlap policy
pub fn resolve_sleep_conflicts(sessions: Vec<UnifiedSleepRecord>) -> Vec<UnifiedSleepRecord> {
    default_resolver().resolve_sleep_conflicts(sessions)
}

fn default_resolver() -> &'static SourceOfTruthResolver {
    static DEFAULT: OnceLock<SourceOfTruthResolver> = OnceLock::new();
    DEFAULT.get_or_init(SourceOfTruthResolver::default)
}
