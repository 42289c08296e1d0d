// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;

use crate::cli::CliArgs;
use crate::config::env::ParentEnv;
use crate::config::model::JobConfig;
use crate::errors::{CronnerError, Result};

const NAME_PATTERN: &str = r"^[a-zA-Z0-9_\. ]+$";

impl TryFrom<CliArgs> for JobConfig {
    type Error = CronnerError;

    fn try_from(args: CliArgs) -> std::result::Result<Self, Self::Error> {
        JobConfig::from_args(args, ParentEnv::from_env())
    }
}

impl JobConfig {
    /// Validate CLI arguments and turn them into a `JobConfig`, with the
    /// parent environment supplied by the caller.
    pub fn from_args(args: CliArgs, parent: ParentEnv) -> Result<Self> {
        let names = Regex::new(NAME_PATTERN).map_err(anyhow::Error::from)?;

        let label = validate_label(&names, &args.label)?;
        let event_group = validate_group(&names, "event group", args.event_group)?;
        let metric_group = validate_group(&names, "metric group", args.metric_group)?;
        ensure_has_command(&args.command)?;

        Ok(JobConfig {
            label,
            command: args.command,
            emit_on_start: args.start_event,
            emit_on_all_events: args.all_events,
            emit_on_failure_only: args.fail_event,
            log_output_on_failure: args.log_fail,
            use_lock: args.lock,
            passthrough_output: args.passthrough,
            sensitive_output: args.sensitive,
            lock_dir: PathBuf::from(args.lock_dir),
            lock_wait_timeout: Duration::from_secs(args.wait_secs),
            warn_after: Duration::from_secs(args.warn_after),
            output_log_dir: PathBuf::from(args.log_path),
            namespace: args.namespace,
            event_group,
            metric_group,
            parent,
        })
    }
}

fn validate_label(names: &Regex, label: &str) -> Result<String> {
    if !names.is_match(label) {
        return Err(CronnerError::ConfigError(format!(
            "cron label '{label}' is invalid, it can only be alphanumeric with underscores, periods, and spaces"
        )));
    }
    Ok(normalise(label))
}

fn validate_group(names: &Regex, what: &str, group: Option<String>) -> Result<Option<String>> {
    match group {
        None => Ok(None),
        Some(g) if g.is_empty() => Ok(None),
        Some(g) if names.is_match(&g) => Ok(Some(normalise(&g))),
        Some(g) => Err(CronnerError::ConfigError(format!(
            "{what} '{g}' is invalid, it can only be alphanumeric with underscores, periods, and spaces"
        ))),
    }
}

fn ensure_has_command(command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) if !program.is_empty() => Ok(()),
        _ => Err(CronnerError::ConfigError(
            "you must specify a command to run".to_string(),
        )),
    }
}

/// Lowercase and replace spaces with underscores to keep metric names sane.
fn normalise(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(cli: &[&str]) -> CliArgs {
        let mut full = vec!["cronner"];
        full.extend_from_slice(cli);
        CliArgs::try_parse_from(full).unwrap()
    }

    fn config_error(result: Result<JobConfig>) -> String {
        match result {
            Err(CronnerError::ConfigError(msg)) => msg,
            Err(e) => panic!("expected ConfigError, got {e:?}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn empty_label_is_rejected() {
        let msg = config_error(JobConfig::from_args(args(&["--", "/bin/true"]), ParentEnv::default()));
        assert_eq!(
            msg,
            "cron label '' is invalid, it can only be alphanumeric with underscores, periods, and spaces"
        );
    }

    #[test]
    fn bad_label_characters_are_rejected() {
        let msg = config_error(JobConfig::from_args(
            args(&["-l", "invalid^label", "--", "/bin/true"]),
            ParentEnv::default(),
        ));
        assert!(msg.contains("invalid^label"));
    }

    #[test]
    fn missing_command_is_rejected() {
        let msg = config_error(JobConfig::from_args(args(&["-l", "test"]), ParentEnv::default()));
        assert_eq!(msg, "you must specify a command to run");
    }

    #[test]
    fn label_and_groups_are_normalised() {
        let cfg = JobConfig::from_args(
            args(&["-l", "Nightly Backup", "-G", "Ops Team", "--", "/bin/true"]),
            ParentEnv::default(),
        )
        .unwrap();

        assert_eq!(cfg.label, "nightly_backup");
        assert_eq!(cfg.event_group.as_deref(), Some("ops_team"));
        assert_eq!(cfg.metric_group, None);
    }

    #[test]
    fn bad_group_is_rejected() {
        let msg = config_error(JobConfig::from_args(
            args(&["-l", "x", "-g", "a|b", "--", "/bin/true"]),
            ParentEnv::default(),
        ));
        assert!(msg.starts_with("metric group 'a|b' is invalid"));
    }

    #[test]
    fn flags_map_onto_config() {
        let cfg = JobConfig::from_args(
            args(&["-l", "t", "-e", "-F", "-k", "-W", "5", "-w", "2", "-p", "--", "/bin/true", "x"]),
            ParentEnv::default(),
        )
        .unwrap();

        assert!(cfg.emit_on_all_events && cfg.should_emit_start());
        assert!(cfg.log_output_on_failure);
        assert!(cfg.use_lock);
        assert!(cfg.passthrough_output);
        assert_eq!(cfg.lock_wait_timeout, Duration::from_secs(5));
        assert_eq!(cfg.warn_after, Duration::from_secs(2));
        assert_eq!(cfg.command, vec!["/bin/true", "x"]);
    }
}
