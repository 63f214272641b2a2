// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use clap::Parser;
use health_reconciler::config::ReconciliationConfig;
use health_reconciler::engine::ReconciliationEngine;
use health_reconciler::logging;
use health_reconciler::models::RawActivityRecord;
use serde::Serialize;
use std::fs;
use tracing::info;

#[derive(Parser)]
#[command(name = "reconcile-file")]
#[command(about = "Run one reconciliation pass over a JSON file of raw provider records")]
struct Args {
    /// JSON array of `{"source": ..., "payload": {...}}` records
    #[arg(long)]
    input: String,

    /// Reconciliation config file (TOML)
    #[arg(long)]
    config: Option<String>,

    /// Treat payloads as sleep sessions instead of activities
    #[arg(long)]
    sleep: bool,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    logging::init_from_env()?;

    let args = Args::parse();
    let config = ReconciliationConfig::load(args.config.clone())?;
    let engine = ReconciliationEngine::from_config(&config);
    engine
        .normalizer()
        .registry()
        .validate()
        .context("Invalid provider mapping tables")?;

    let content = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file: {}", args.input))?;
    let records: Vec<RawActivityRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse raw records from: {}", args.input))?;
    info!(input = %args.input, records = records.len(), "Loaded raw records");

    if args.sleep {
        print_json(&engine.reconcile_sleep(records), args.pretty)
    } else {
        print_json(&engine.reconcile(records), args.pretty)
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize reconciliation outcome")?;
    println!("{}", output);
    Ok(())
}
