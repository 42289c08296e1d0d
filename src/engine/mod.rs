// src/engine/mod.rs

//! Orchestration engine for cronner.
//!
//! One run walks through:
//! start notification → lock → launch + watchdog → duration → unlock →
//! metrics → completion notification → failure output log.
//!
//! - [`orchestrator`] drives that sequence.
//! - [`watchdog`] multiplexes process completion with the still-running
//!   timer.
//! - [`report`] formats and sends the notifications and metrics.

use std::path::PathBuf;

use anyhow::Context;
use uuid::Uuid;

use crate::config::JobConfig;
use crate::errors::{CronnerError, Result};

pub mod orchestrator;
pub mod report;
pub mod watchdog;

pub use orchestrator::Orchestrator;
pub use report::Reporter;
pub use watchdog::wait_with_watchdog;

/// Per-invocation identity, fixed before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Fresh UUID per invocation; ties notifications and the failure log
    /// together.
    pub correlation_id: String,
    pub hostname: String,
    pub lock_path: PathBuf,
}

impl RunContext {
    /// Generate a correlation id and resolve the local hostname.
    pub fn new(config: &JobConfig) -> Result<Self> {
        let hostname = hostname::get()
            .context("resolving local hostname")?
            .to_string_lossy()
            .into_owned();
        Ok(Self::with_identity(config, new_correlation_id(), hostname))
    }

    pub fn with_identity(
        config: &JobConfig,
        correlation_id: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            hostname: hostname.into(),
            lock_path: config.lock_path(),
        }
    }
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// What happened to the failure output log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLog {
    /// Run succeeded or logging on failure is off.
    NotRequested,
    Written(PathBuf),
    /// Writing failed; output went to stderr unless sensitive. Fatal for the
    /// binary.
    Failed(PathBuf),
}

/// Result of one orchestrated run.
#[derive(Debug)]
pub struct RunOutcome {
    /// 0, the command's own exit status, or the internal error code.
    pub exit_code: i32,
    /// Combined stdout/stderr; empty when nothing needed it.
    pub output: Vec<u8>,
    /// Wall-clock run time in milliseconds; `-1.0` if the command never ran.
    pub duration_ms: f64,
    pub error: Option<CronnerError>,
    pub output_log: OutputLog,
}

impl RunOutcome {
    /// Outcome for a run that failed before the command was launched.
    pub fn not_started(err: CronnerError) -> Self {
        Self {
            exit_code: err.exit_code(),
            output: Vec::new(),
            duration_ms: -1.0,
            error: Some(err),
            output_log: OutputLog::NotRequested,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}
