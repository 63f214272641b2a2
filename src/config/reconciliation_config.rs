// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reconciliation tuning: source priorities, overlap policy, merge strategy
//! and per-source activity-type overrides

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::constants::env_config;
use crate::models::ActivityType;
use crate::providers::MappingRegistry;
use crate::resolver::{MergeStrategy, OverlapPolicy, PriorityTable, ResolverConfig};

/// Main reconciliation configuration structure
///
/// Every section is optional; omitted sections keep the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    pub merge_strategy: MergeStrategy,
    /// Priorities merged over the built-in table
    pub priorities: HashMap<String, i32>,
    pub overlap: OverlapPolicy,
    /// `source -> provider activity type -> unified type`, merged over the built-in tables
    pub activity_types: HashMap<String, HashMap<String, ActivityType>>,
}

impl ReconciliationConfig {
    /// Load configuration from the first file found, or use defaults.
    ///
    /// Lookup order: explicit `path`, `$RECONCILER_CONFIG`, `./reconciler.toml`,
    /// then the user config directory. Environment overrides apply on top.
    pub fn load(path: Option<String>) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = match path.or_else(env_config::config_path) {
            Some(config_path) => Self::load_from_file(&config_path)?,
            None => match Self::discover() {
                Some(found) => Self::load_from_file(&found)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(env_config::overlap_fraction(), env_config::merge_strategy());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read reconciliation config file: {}", path))?;

        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse reconciliation config file: {}", path))?;

        info!(config.path = %path, "Loaded reconciliation config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ReconciliationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn discover() -> Option<String> {
        if Path::new(env_config::LOCAL_CONFIG_FILE).exists() {
            return Some(env_config::LOCAL_CONFIG_FILE.to_string());
        }
        dirs::config_dir()
            .map(|dir| dir.join(env_config::USER_CONFIG_FILE))
            .filter(|path| path.exists())
            .map(|path| path.to_string_lossy().to_string())
    }

    /// Apply overlap-fraction and merge-strategy overrides
    pub fn apply_overrides(&mut self, overlap_fraction: Option<f64>, merge_strategy: Option<String>) {
        if let Some(min_fraction) = overlap_fraction {
            self.overlap = OverlapPolicy::ShorterFraction { min_fraction };
        }
        if let Some(name) = merge_strategy {
            match MergeStrategy::from_name(&name) {
                Some(strategy) => self.merge_strategy = strategy,
                None => warn!(merge_strategy = %name, "Ignoring unknown merge strategy override"),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let OverlapPolicy::ShorterFraction { min_fraction } = self.overlap {
            if !(min_fraction > 0.0 && min_fraction <= 1.0) {
                bail!(
                    "overlap min_fraction must be in (0, 1], got {}",
                    min_fraction
                );
            }
        }
        Ok(())
    }

    /// Resolver settings: built-in priorities with configured ones merged over
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut priorities = PriorityTable::default();
        priorities.extend(&self.priorities);
        ResolverConfig {
            priorities,
            overlap: self.overlap,
            merge: self.merge_strategy,
        }
    }

    /// Built-in mapping tables with configured activity-type overrides applied
    pub fn mapping_registry(&self) -> MappingRegistry {
        let mut registry = MappingRegistry::with_defaults();
        for (source, overrides) in &self.activity_types {
            if !registry.override_activity_types(source, overrides) {
                warn!(source = %source, "Activity type overrides for a source with no mapping");
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ReconciliationConfig::default();
        let resolver = config.resolver_config();

        assert_eq!(resolver.priorities.priority("apple_health"), 10);
        assert_eq!(resolver.priorities.priority("health_connect"), 10);
        assert_eq!(resolver.priorities.priority("strava"), 8);
        assert_eq!(resolver.priorities.priority("manual"), 5);
        assert_eq!(resolver.priorities.priority("fitbit"), 0);
        assert_eq!(resolver.overlap, OverlapPolicy::ShorterFraction { min_fraction: 0.5 });
        assert_eq!(resolver.merge, MergeStrategy::PreferHighestPriority);
    }

    #[test]
    fn test_config_file_loading() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(
            temp_file,
            r#"
merge_strategy = "fill_missing"

[priorities]
oura = 9
strava = 11

[overlap]
policy = "intersection"

[activity_types.strava]
"Elliptical" = "strength"
"Run" = "unknown"
        "#
        )?;

        let config = ReconciliationConfig::load_from_file(temp_file.path().to_str().unwrap())?;
        let resolver = config.resolver_config();

        assert_eq!(resolver.merge, MergeStrategy::FillMissing);
        assert_eq!(resolver.overlap, OverlapPolicy::Intersection);
        assert_eq!(resolver.priorities.priority("oura"), 9);
        assert_eq!(resolver.priorities.priority("strava"), 11);
        assert_eq!(resolver.priorities.priority("apple_health"), 10);

        let registry = config.mapping_registry();
        let strava = registry.activity_mapping("strava").unwrap();
        assert_eq!(strava.map_activity_type("Elliptical"), ActivityType::Strength);
        assert_eq!(strava.map_activity_type("Run"), ActivityType::Unknown);
        assert_eq!(strava.map_activity_type("Ride"), ActivityType::Cycle);

        Ok(())
    }

    #[test]
    fn test_fraction_defaults_when_omitted() -> Result<()> {
        let config = ReconciliationConfig::from_toml_str("[overlap]\npolicy = \"shorter_fraction\"\n")?;
        assert_eq!(config.overlap, OverlapPolicy::ShorterFraction { min_fraction: 0.5 });

        let config = ReconciliationConfig::from_toml_str(
            "[overlap]\npolicy = \"shorter_fraction\"\nmin_fraction = 0.8\n",
        )?;
        assert_eq!(config.overlap, OverlapPolicy::ShorterFraction { min_fraction: 0.8 });
        Ok(())
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        for content in [
            "[overlap]\npolicy = \"shorter_fraction\"\nmin_fraction = 0.0\n",
            "[overlap]\npolicy = \"shorter_fraction\"\nmin_fraction = 1.5\n",
        ] {
            assert!(ReconciliationConfig::from_toml_str(content).is_err());
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ReconciliationConfig::load_from_file("/nonexistent/reconciler.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read reconciliation config file"));
    }

    #[test]
    fn test_overrides() {
        let mut config = ReconciliationConfig::default();
        config.apply_overrides(Some(0.25), Some("fill_missing".to_string()));
        assert_eq!(config.overlap, OverlapPolicy::ShorterFraction { min_fraction: 0.25 });
        assert_eq!(config.merge_strategy, MergeStrategy::FillMissing);

        config.apply_overrides(None, Some("average".to_string()));
        assert_eq!(config.merge_strategy, MergeStrategy::FillMissing);

        config.apply_overrides(Some(3.0), None);
        assert!(config.validate().is_err());
    }
}
