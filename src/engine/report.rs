// src/engine/report.rs

//! Notification texts and metric emission for a run.

use tracing::{debug, warn};

use super::RunContext;
use crate::config::JobConfig;
use crate::emit::{Event, MetricsEmitter, NotificationEmitter, SOURCE_TYPE, Severity};
use crate::errors::CronnerError;

/// Sends everything a run reports. Emission failures are logged and
/// swallowed; they never change the run's outcome.
pub struct Reporter<'a> {
    config: &'a JobConfig,
    ctx: &'a RunContext,
    events: &'a dyn NotificationEmitter,
    metrics: &'a dyn MetricsEmitter,
}

impl<'a> Reporter<'a> {
    pub fn new(
        config: &'a JobConfig,
        ctx: &'a RunContext,
        events: &'a dyn NotificationEmitter,
        metrics: &'a dyn MetricsEmitter,
    ) -> Self {
        Self {
            config,
            ctx,
            events,
            metrics,
        }
    }

    pub fn starting(&self) {
        let title = format!("Cron {} starting on {}", self.config.label, self.ctx.hostname);
        let body = format!("UUID: {}\n", self.ctx.correlation_id);
        self.send(title, &body, Severity::Info);
    }

    pub fn still_running(&self, elapsed_secs: u64) {
        let title = format!(
            "Cron {} still running after {} seconds on {}",
            self.config.label, elapsed_secs, self.ctx.hostname
        );
        let body = format!(
            "UUID: {}\nrunning for {} seconds",
            self.ctx.correlation_id, elapsed_secs
        );
        self.send(title, &body, Severity::Warning);
    }

    pub fn completed(
        &self,
        exit_code: i32,
        duration_ms: f64,
        output: &[u8],
        error: Option<&CronnerError>,
    ) {
        let (verb, severity) = match error {
            None => ("succeeded", Severity::Success),
            Some(_) => ("failed", Severity::Error),
        };
        let title = format!(
            "Cron {} {} in {:.5} seconds on {}",
            self.config.label,
            verb,
            duration_ms / 1000.0,
            self.ctx.hostname
        );
        let body = completion_body(&self.ctx.correlation_id, exit_code, output, error);
        self.send(title, &body, severity);
    }

    /// `{label}.time` and `{label}.exit_code`, always together.
    pub fn run_metrics(&self, duration_ms: f64, exit_code: i32) {
        let tags = self.metric_tags();
        let label = &self.config.label;

        if let Err(e) = self.metrics.timing(&format!("{label}.time"), duration_ms, &tags) {
            warn!(error = %e, "failed to emit timing metric");
        }
        if let Err(e) = self
            .metrics
            .gauge(&format!("{label}.exit_code"), f64::from(exit_code), &tags)
        {
            warn!(error = %e, "failed to emit exit code metric");
        }
    }

    fn send(&self, title: String, body: &str, severity: Severity) {
        let event = Event::new(title, body, severity)
            .aggregation_key(self.ctx.correlation_id.as_str())
            .source_type_name(SOURCE_TYPE)
            .tags(self.event_tags());

        debug!(title = %event.title, %severity, "emitting event");
        if let Err(e) = self.events.event(&event) {
            warn!(error = %e, title = %event.title, "failed to emit event");
        }
    }

    fn event_tags(&self) -> Vec<String> {
        let mut tags = vec![
            format!("source_type:{SOURCE_TYPE}"),
            format!("cronner_label_name:{}", self.config.label),
        ];
        if let Some(group) = &self.config.event_group {
            tags.push(format!("cronner_group:{group}"));
        }
        tags.extend(self.config.parent.event_tags());
        tags
    }

    fn metric_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if let Some(group) = &self.config.metric_group {
            tags.push(format!("cronner_group:{group}"));
        }
        tags.extend(self.config.parent.metric_tags());
        tags
    }
}

/// Body of the completion event.
///
/// A plain non-zero exit already shows up as `exit code:`, so only errors
/// carrying more than that get a `more:` line.
pub fn completion_body(
    correlation_id: &str,
    exit_code: i32,
    output: &[u8],
    error: Option<&CronnerError>,
) -> String {
    let mut body = format!("UUID: {correlation_id}\nexit code: {exit_code}\n");

    if let Some(err) = error {
        if !matches!(err, CronnerError::ProcessExit { .. }) {
            body.push_str(&format!("more: {err}\n"));
        }
    }

    if output.is_empty() {
        body.push_str("output: (none)");
    } else {
        body.push_str("output: ");
        body.push_str(&String::from_utf8_lossy(output));
    }
    body
}
