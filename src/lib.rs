// src/lib.rs

pub mod cli;
pub mod config;
pub mod emit;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod lock;
pub mod logging;
pub mod output;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::JobConfig;
use crate::emit::DogStatsd;
use crate::engine::{Orchestrator, OutputLog, RunContext};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config validation
/// - run identity (correlation id, hostname)
/// - the DogStatsD client
/// - the orchestrator
///
/// and returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let statsd_addr = args.statsd_addr.clone();
    let config = JobConfig::try_from(args)?;
    let ctx = RunContext::new(&config)?;

    debug!(?config, correlation_id = %ctx.correlation_id, "configuration validated");

    let statsd = DogStatsd::connect(&statsd_addr, config.namespace.as_str())
        .with_context(|| format!("connecting to statsd at {statsd_addr}"))?;

    let outcome = Orchestrator::new(&config, &ctx, &statsd, &statsd).run().await;

    match &outcome.error {
        None => info!(duration_ms = outcome.duration_ms, "job succeeded"),
        Some(err) if err.is_process_failure() => {
            info!(exit_code = outcome.exit_code, error = %err, "job failed")
        }
        Some(err) => error!(exit_code = outcome.exit_code, error = %err, "cronner failure"),
    }

    if let OutputLog::Failed(path) = &outcome.output_log {
        error!(path = %path.display(), "could not save failure output");
        return Ok(1);
    }

    Ok(outcome.exit_code)
}
