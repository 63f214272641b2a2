// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Batch reconciliation: normalize a mixed batch of raw records, set aside
//! the ones that cannot be normalized, and resolve the rest.

use serde::Serialize;
use std::time::Instant;
use tracing::info_span;
use uuid::Uuid;

use crate::config::ReconciliationConfig;
use crate::logging::AppLogger;
use crate::models::{RawActivityRecord, UnifiedActivity, UnifiedSleepRecord};
use crate::normalizer::{NormalizationError, Normalizer};
use crate::resolver::{Reconcilable, SourceOfTruthResolver};

/// A raw record the normalizer refused, by its position in the batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub source: String,
    pub reason: String,
    #[serde(skip)]
    pub error: NormalizationError,
}

impl RejectedRecord {
    fn new(index: usize, source: &str, error: NormalizationError) -> Self {
        Self {
            index,
            source: source.to_string(),
            reason: error.to_string(),
            error,
        }
    }
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationOutcome<T> {
    pub pass_id: Uuid,
    /// Resolved records, ascending by start time
    pub records: Vec<T>,
    pub rejected: Vec<RejectedRecord>,
}

impl<T> ReconciliationOutcome<T> {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Normalizer and resolver wired together
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    normalizer: Normalizer,
    resolver: SourceOfTruthResolver,
}

impl ReconciliationEngine {
    pub fn new(normalizer: Normalizer, resolver: SourceOfTruthResolver) -> Self {
        Self {
            normalizer,
            resolver,
        }
    }

    pub fn from_config(config: &ReconciliationConfig) -> Self {
        Self::new(
            Normalizer::new(config.mapping_registry()),
            SourceOfTruthResolver::new(config.resolver_config()),
        )
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn resolver(&self) -> &SourceOfTruthResolver {
        &self.resolver
    }

    /// Normalize and deduplicate a batch of raw activity records
    pub fn reconcile<I>(&self, records: I) -> ReconciliationOutcome<UnifiedActivity>
    where
        I: IntoIterator<Item = RawActivityRecord>,
    {
        self.run("activity", records, |record| {
            self.normalizer.normalize_record(record)
        })
    }

    /// Normalize and deduplicate a batch of raw sleep records
    pub fn reconcile_sleep<I>(&self, records: I) -> ReconciliationOutcome<UnifiedSleepRecord>
    where
        I: IntoIterator<Item = RawActivityRecord>,
    {
        self.run("sleep", records, |record| {
            self.normalizer.normalize_sleep_record(record)
        })
    }

    fn run<T, I, F>(&self, kind: &str, records: I, normalize: F) -> ReconciliationOutcome<T>
    where
        T: Reconcilable,
        I: IntoIterator<Item = RawActivityRecord>,
        F: Fn(&RawActivityRecord) -> Result<T, NormalizationError>,
    {
        let pass_id = Uuid::new_v4();
        let span = info_span!("reconciliation_pass", pass.id = %pass_id, pass.kind = %kind);
        let _guard = span.enter();
        let started = Instant::now();

        let mut normalized = Vec::new();
        let mut rejected = Vec::new();
        let mut received = 0;
        for (index, record) in records.into_iter().enumerate() {
            received += 1;
            match normalize(&record) {
                Ok(unified) => normalized.push(unified),
                Err(error) => {
                    let rejection = RejectedRecord::new(index, &record.source, error);
                    AppLogger::log_record_rejected(&pass_id, index, &record.source, &rejection.reason);
                    rejected.push(rejection);
                }
            }
        }

        let resolved = self.resolver.resolve(normalized);
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_reconciliation_pass(
            &pass_id,
            kind,
            received,
            rejected.len(),
            resolved.len(),
            duration_ms,
        );

        ReconciliationOutcome {
            pass_id,
            records: resolved,
            rejected,
        }
    }
}
