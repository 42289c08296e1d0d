#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use cronner::config::{JobConfig, ParentEnv};

/// Builder for `JobConfig` to simplify test setup.
///
/// Starts from `JobConfig::new` (everything off) with lock and log
/// directories pointing at the given scratch directory.
pub struct JobConfigBuilder {
    config: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(label: &str, argv: &[&str]) -> Self {
        Self {
            config: JobConfig::new(label, argv.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.config.lock_dir = dir.to_path_buf();
        self.config.output_log_dir = dir.to_path_buf();
        self
    }

    pub fn all_events(mut self) -> Self {
        self.config.emit_on_all_events = true;
        self
    }

    pub fn start_event(mut self) -> Self {
        self.config.emit_on_start = true;
        self
    }

    pub fn fail_event(mut self) -> Self {
        self.config.emit_on_failure_only = true;
        self
    }

    pub fn log_fail(mut self) -> Self {
        self.config.log_output_on_failure = true;
        self
    }

    pub fn lock(mut self) -> Self {
        self.config.use_lock = true;
        self
    }

    pub fn wait_secs(mut self, secs: u64) -> Self {
        self.config.lock_wait_timeout = Duration::from_secs(secs);
        self
    }

    pub fn warn_after_secs(mut self, secs: u64) -> Self {
        self.config.warn_after = Duration::from_secs(secs);
        self
    }

    pub fn passthrough(mut self) -> Self {
        self.config.passthrough_output = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.config.sensitive_output = true;
        self
    }

    pub fn event_group(mut self, group: &str) -> Self {
        self.config.event_group = Some(group.to_string());
        self
    }

    pub fn metric_group(mut self, group: &str) -> Self {
        self.config.metric_group = Some(group.to_string());
        self
    }

    pub fn parent(mut self, parent: ParentEnv) -> Self {
        self.config.parent = parent;
        self
    }

    pub fn build(self) -> JobConfig {
        self.config
    }
}
