// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Provider keys, default resolution parameters, unit conversion factors and
//! environment-based overrides.

use std::env;

/// Provider keys accepted by the normalizer
pub mod sources {
    pub const STRAVA: &str = "strava";
    pub const APPLE_HEALTH: &str = "apple_health";
    pub const HEALTH_CONNECT: &str = "health_connect";
    pub const FITBIT: &str = "fitbit";
    pub const OURA: &str = "oura";
    pub const MANUAL: &str = "manual";

    /// Every provider with a built-in activity mapping table
    pub const ALL: [&str; 6] = [STRAVA, APPLE_HEALTH, HEALTH_CONNECT, FITBIT, OURA, MANUAL];
}

/// Source-of-truth defaults
pub mod resolution {
    /// Default source priorities (higher wins)
    pub const DEFAULT_PRIORITIES: [(&str, i32); 4] = [
        (super::sources::APPLE_HEALTH, 10),
        (super::sources::HEALTH_CONNECT, 10),
        (super::sources::STRAVA, 8),
        (super::sources::MANUAL, 5),
    ];

    /// Priority of any source missing from the priority table
    pub const UNRANKED_PRIORITY: i32 = 0;

    /// Default share of the shorter interval two records must share to be one event
    pub const DEFAULT_MIN_OVERLAP_FRACTION: f64 = 0.5;
}

/// Unit conversion factors into unified units (seconds, meters, kilocalories)
pub mod units {
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
    pub const MILLIS_PER_SECOND: f64 = 1_000.0;

    pub const METERS_PER_KILOMETER: f64 = 1_000.0;
    pub const METERS_PER_MILE: f64 = 1_609.344;
    pub const METERS_PER_YARD: f64 = 0.9144;
    pub const METERS_PER_FOOT: f64 = 0.3048;

    pub const KILOJOULES_PER_KILOCALORIE: f64 = 4.184;
}

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Explicit configuration file path, if set
    pub fn config_path() -> Option<String> {
        env::var("RECONCILER_CONFIG").ok().filter(|p| !p.trim().is_empty())
    }

    /// Overlap fraction override, if set and parseable
    pub fn overlap_fraction() -> Option<f64> {
        env::var("RECONCILER_OVERLAP_FRACTION")
            .ok()
            .and_then(|v| v.trim().parse().ok())
    }

    /// Merge strategy override (`prefer_highest_priority` or `fill_missing`)
    pub fn merge_strategy() -> Option<String> {
        env::var("RECONCILER_MERGE_STRATEGY").ok()
    }

    /// Config file looked up in the working directory
    pub const LOCAL_CONFIG_FILE: &str = "reconciler.toml";

    /// Config file path relative to the user config dir
    pub const USER_CONFIG_FILE: &str = "health-reconciler/config.toml";
}

/// Service identity used by structured logging
pub mod service {
    pub const SERVICE_NAME: &str = "health-reconciler";
    pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
}
