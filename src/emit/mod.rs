// src/emit/mod.rs

//! Outbound notifications and metrics.
//!
//! The orchestrator only talks to the [`NotificationEmitter`] and
//! [`MetricsEmitter`] traits; [`statsd::DogStatsd`] is the production
//! implementation of both. Tests swap in a recording emitter.

use std::fmt;

use crate::errors::Result;

pub mod statsd;
pub mod truncate;

pub use statsd::DogStatsd;
pub use truncate::{MAX_BODY, TRUNCATION_MARKER, truncate_body};

/// Value of the `source_type_name` field and `source_type:` tag.
pub const SOURCE_TYPE: &str = "cronner";

/// Event severity (DogStatsD `alert_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification as sent to the event backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub title: String,
    /// Already truncated to [`MAX_BODY`].
    pub body: String,
    pub severity: Severity,
    /// Correlation id; groups start/warning/completion of one run.
    pub aggregation_key: Option<String>,
    pub source_type_name: Option<String>,
    pub tags: Vec<String>,
}

impl Event {
    /// Build an event, truncating `body` if needed.
    pub fn new(title: impl Into<String>, body: &str, severity: Severity) -> Self {
        Self {
            title: title.into(),
            body: truncate_body(body),
            severity,
            aggregation_key: None,
            source_type_name: None,
            tags: Vec::new(),
        }
    }

    pub fn aggregation_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.aggregation_key = (!key.is_empty()).then_some(key);
        self
    }

    pub fn source_type_name(mut self, name: impl Into<String>) -> Self {
        self.source_type_name = Some(name.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Fire-and-forget event sink.
pub trait NotificationEmitter: Send + Sync {
    fn event(&self, event: &Event) -> Result<()>;
}

/// Fire-and-forget metric sink. Names are relative to the emitter's
/// namespace.
pub trait MetricsEmitter: Send + Sync {
    fn timing(&self, name: &str, value_ms: f64, tags: &[String]) -> Result<()>;
    fn gauge(&self, name: &str, value: f64, tags: &[String]) -> Result<()>;
}
