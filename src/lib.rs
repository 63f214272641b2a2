// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Health Reconciler
//!
//! Normalization and deduplication for health and fitness data pulled from
//! several providers at once. A user who records a run on a watch will often
//! see it arrive from Strava, Apple Health and Health Connect; this crate turns
//! those payloads into one schema and keeps a single authoritative copy.
//!
//! ## Features
//!
//! - **Table-driven normalization**: per-provider field, unit and activity-type
//!   tables for Strava, Apple Health, Health Connect, Fitbit, Oura and manual entry
//! - **Source-of-truth resolution**: overlap detection with a configurable
//!   policy and priority-based winner selection
//! - **Sleep sessions**: the same pipeline for nightly sleep summaries
//! - **Configurable**: priorities, overlap threshold, merge strategy and
//!   activity-type overrides from TOML and environment
//!
//! ## Architecture
//!
//! - **Providers**: mapping tables, one module per source
//! - **Normalizer**: raw payload to [`UnifiedActivity`] / [`UnifiedSleepRecord`]
//! - **Resolver**: sort, scan, group, pick a winner
//! - **Engine**: one batch pass combining both, with rejected records reported
//!   alongside the result
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use health_reconciler::config::ReconciliationConfig;
//! use health_reconciler::engine::ReconciliationEngine;
//! use health_reconciler::models::RawActivityRecord;
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ReconciliationConfig::load(None)?;
//!     let engine = ReconciliationEngine::from_config(&config);
//!
//!     let outcome = engine.reconcile(vec![
//!         RawActivityRecord::new(
//!             "strava",
//!             json!({"id": 1, "type": "Run", "start_date": "2024-01-15T08:00:00Z", "moving_time": 1800, "distance": 5000}),
//!         ),
//!         RawActivityRecord::new(
//!             "apple_health",
//!             json!({"uuid": "A1", "workoutActivityType": "HKWorkoutActivityTypeRunning", "startDate": "2024-01-15T08:00:30Z", "duration": 1790}),
//!         ),
//!     ]);
//!
//!     for activity in &outcome.records {
//!         println!("{} {} from {}", activity.start_time, activity.activity_type.display_name(), activity.source);
//!     }
//!     Ok(())
//! }
//! ```

/// Provider mapping tables
pub mod providers;

/// Unified data models for health records
pub mod models;

/// Raw payload normalization
pub mod normalizer;

/// Overlap detection and source-of-truth selection
pub mod resolver;

/// Batch reconciliation passes
pub mod engine;

/// Configuration management
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Production logging and structured output
pub mod logging;

pub use engine::{ReconciliationEngine, ReconciliationOutcome, RejectedRecord};
pub use models::{ActivityType, RawActivityRecord, UnifiedActivity, UnifiedSleepRecord};
pub use normalizer::{normalize, normalize_sleep, NormalizationError, Normalizer};
pub use resolver::{
    resolve_conflicts, resolve_sleep_conflicts, MergeStrategy, OverlapPolicy, ResolverConfig,
    SourceOfTruthResolver,
};
