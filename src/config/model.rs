// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::env::ParentEnv;

/// Validated, immutable description of a single cronner run.
///
/// Build it with `JobConfig::try_from(CliArgs)` (see `validate.rs`); tests
/// can also fill the fields directly.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Normalised label (lowercase, no spaces).
    pub label: String,
    /// Program followed by its arguments. Never empty.
    pub command: Vec<String>,

    pub emit_on_start: bool,
    pub emit_on_all_events: bool,
    pub emit_on_failure_only: bool,
    pub log_output_on_failure: bool,
    pub use_lock: bool,
    pub passthrough_output: bool,
    pub sensitive_output: bool,

    pub lock_dir: PathBuf,
    /// Zero means "fail fast if already locked".
    pub lock_wait_timeout: Duration,
    /// Zero disables the still-running watchdog.
    pub warn_after: Duration,
    pub output_log_dir: PathBuf,

    /// Metric namespace, prepended by the statsd client.
    pub namespace: String,
    pub event_group: Option<String>,
    pub metric_group: Option<String>,

    /// Tags inherited from an enclosing cronner invocation.
    pub parent: ParentEnv,
}

impl JobConfig {
    /// A config with every optional behaviour switched off.
    pub fn new(label: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            label: label.into(),
            command,
            emit_on_start: false,
            emit_on_all_events: false,
            emit_on_failure_only: false,
            log_output_on_failure: false,
            use_lock: false,
            passthrough_output: false,
            sensitive_output: false,
            lock_dir: PathBuf::from("/var/lock"),
            lock_wait_timeout: Duration::ZERO,
            warn_after: Duration::ZERO,
            output_log_dir: PathBuf::from("/var/log/cronner"),
            namespace: "cronner".to_string(),
            event_group: None,
            metric_group: None,
            parent: ParentEnv::default(),
        }
    }

    /// `{lock_dir}/cronner-{label}.lock`
    pub fn lock_path(&self) -> PathBuf {
        lock_path_for(&self.lock_dir, &self.label)
    }

    /// `{output_log_dir}/{label}-{correlation_id}.out`
    pub fn output_log_path(&self, correlation_id: &str) -> PathBuf {
        self.output_log_dir
            .join(format!("{}-{}.out", self.label, correlation_id))
    }

    /// Whether anything downstream reads the captured output.
    pub fn needs_output(&self) -> bool {
        self.emit_on_all_events || self.emit_on_failure_only || self.log_output_on_failure
    }

    pub fn should_emit_start(&self) -> bool {
        self.emit_on_start || self.emit_on_all_events
    }

    pub fn should_emit_completion(&self, failed: bool) -> bool {
        self.emit_on_all_events || (self.emit_on_failure_only && failed)
    }

    /// Whether the failure-log fallback must keep output off stderr.
    ///
    /// Passthrough output has already reached the terminal, so it is never
    /// printed a second time.
    pub fn fallback_is_sensitive(&self) -> bool {
        self.sensitive_output || self.passthrough_output
    }
}

pub fn lock_path_for(lock_dir: &Path, label: &str) -> PathBuf {
    lock_dir.join(format!("cronner-{label}.lock"))
}
