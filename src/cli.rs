// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cronner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cronner",
    version,
    about = "Run a scheduled command with locking, timing metrics and DogStatsD events.",
    long_about = None
)]
pub struct CliArgs {
    /// Name for the job, used in metric names, events and the lock file.
    ///
    /// Alphanumeric with underscores, periods and spaces; cronner lowercases
    /// it and turns spaces into underscores.
    #[arg(short = 'l', long, value_name = "LABEL", default_value = "")]
    pub label: String,

    /// Emit a start and a completion event.
    #[arg(short = 'e', long = "event")]
    pub all_events: bool,

    /// Emit a start event only.
    #[arg(short = 'S', long = "event-start")]
    pub start_event: bool,

    /// Only emit a completion event when the command fails.
    #[arg(short = 'E', long = "event-fail")]
    pub fail_event: bool,

    /// When the command fails, save its full output (stdout/stderr) under
    /// `--log-path`, named after the label and the run UUID.
    #[arg(short = 'F', long = "log-fail")]
    pub log_fail: bool,

    /// Where to place failure output files.
    #[arg(long, value_name = "DIR", default_value = "/var/log/cronner")]
    pub log_path: String,

    /// Group tag attached to emitted events.
    #[arg(short = 'G', long, value_name = "GROUP")]
    pub event_group: Option<String>,

    /// Group tag attached to emitted metrics.
    #[arg(short = 'g', long = "group", value_name = "GROUP")]
    pub metric_group: Option<String>,

    /// Lock based on the label so that commands sharing a label never run
    /// concurrently.
    #[arg(short = 'k', long)]
    pub lock: bool,

    /// Directory where lock files are placed.
    #[arg(short = 'd', long, value_name = "DIR", default_value = "/var/lock")]
    pub lock_dir: String,

    /// Seconds to wait for the lock before giving up (0 = fail immediately).
    #[arg(short = 'W', long = "wait-secs", value_name = "SECS", default_value_t = 0)]
    pub wait_secs: u64,

    /// Emit a warning event every N seconds while the command is still
    /// running (0 = disabled).
    #[arg(short = 'w', long, value_name = "SECS", default_value_t = 0)]
    pub warn_after: u64,

    /// Namespace prepended to metric names.
    #[arg(short = 'N', long, value_name = "NS", default_value = "cronner")]
    pub namespace: String,

    /// Pass the command's stdout/stderr through to ours.
    #[arg(short = 'p', long = "passthru")]
    pub passthrough: bool,

    /// Command output may hold secrets: never print it to stderr.
    #[arg(short = 's', long)]
    pub sensitive: bool,

    /// Logging level.
    ///
    /// If omitted, `CRONNER_LOG` or `error` is used.
    #[arg(short = 'L', long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Address of the DogStatsD agent.
    #[arg(long, value_name = "HOST:PORT", default_value = "127.0.0.1:8125")]
    pub statsd_addr: String,

    /// Command to run and its arguments.
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
