// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Structured logging setup and reconciliation log events.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to binaries and to whatever service embeds the engine.

use anyhow::{anyhow, Result};
use std::env;
use std::io;
use tracing::{info, warn, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};
use uuid::Uuid;

use crate::constants::service;

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
    /// Emit source file and line
    pub include_location: bool,
    /// Emit span open/close events (one per reconciliation pass)
    pub include_spans: bool,
    pub service_name: String,
    /// Deployment name (development, staging, production)
    pub environment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable multi-field lines
    Pretty,
    /// Single-line, no targets
    Compact,
}

impl LogFormat {
    /// Unrecognized names fall back to `Pretty`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
            include_spans: false,
            service_name: service::SERVICE_NAME.to_string(),
            environment: "development".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `ENVIRONMENT` and `SERVICE_NAME`.
    ///
    /// Production turns on locations and span events; elsewhere they are
    /// opt-in through `LOG_INCLUDE_LOCATION` / `LOG_INCLUDE_SPANS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let production = environment == "production";

        Self {
            level: env::var("RUST_LOG").unwrap_or(defaults.level),
            format: env::var("LOG_FORMAT")
                .map(|name| LogFormat::from_name(&name))
                .unwrap_or(defaults.format),
            include_location: production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: production || env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            environment,
        }
    }

    /// Install the global subscriber, writing to stderr so stdout stays free
    /// for command output. Fails if a subscriber is already installed.
    pub fn init(&self) -> Result<()> {
        tracing_subscriber::registry()
            .with(self.env_filter())
            .with(self.output_layer())
            .try_init()
            .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

        info!(
            service.name = %self.service_name,
            service.version = %service::SERVICE_VERSION,
            environment = %self.environment,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    fn output_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(span_events);

        match self.format {
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Pretty => layer.with_target(true).boxed(),
            LogFormat::Compact => layer.compact().with_target(false).boxed(),
        }
    }
}

/// Initialize logging from environment
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Reconciliation log events with stable field names
pub struct AppLogger;

impl AppLogger {
    pub fn log_record_rejected(pass_id: &Uuid, index: usize, source: &str, reason: &str) {
        warn!(
            pass.id = %pass_id,
            record.index = index,
            record.source = %source,
            rejection.reason = %reason,
            "Raw record rejected"
        );
    }

    /// `collapsed` counts records absorbed into another record's group
    pub fn log_reconciliation_pass(
        pass_id: &Uuid,
        kind: &str,
        received: usize,
        rejected: usize,
        resolved: usize,
        duration_ms: u64,
    ) {
        let collapsed = received.saturating_sub(rejected).saturating_sub(resolved);
        info!(
            pass.id = %pass_id,
            pass.kind = %kind,
            records.received = received,
            records.rejected = rejected,
            records.resolved = resolved,
            records.collapsed = collapsed,
            pass.duration_ms = duration_ms,
            "Reconciliation pass complete"
        );
    }
}
