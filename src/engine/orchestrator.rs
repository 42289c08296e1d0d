// src/engine/orchestrator.rs

use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::report::Reporter;
use super::watchdog::wait_with_watchdog;
use super::{OutputLog, RunContext, RunOutcome};
use crate::config::JobConfig;
use crate::config::env::child_env;
use crate::emit::{MetricsEmitter, NotificationEmitter};
use crate::errors::{CronnerError, INTERNAL_ERROR_CODE};
use crate::exec::{self, CommandSpec, OutputMode};
use crate::lock::{self, AdvisoryLock, FileLock, LockGuard};
use crate::output;

/// Runs one command once: lock, launch, watch, time, unlock, report.
pub struct Orchestrator<'a> {
    config: &'a JobConfig,
    ctx: &'a RunContext,
    reporter: Reporter<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a JobConfig,
        ctx: &'a RunContext,
        events: &'a dyn NotificationEmitter,
        metrics: &'a dyn MetricsEmitter,
    ) -> Self {
        Self {
            config,
            ctx,
            reporter: Reporter::new(config, ctx, events, metrics),
        }
    }

    /// Run with the file lock at `ctx.lock_path`.
    pub async fn run(&self) -> RunOutcome {
        self.run_with_lock(FileLock::new(&self.ctx.lock_path)).await
    }

    /// Run with a caller-supplied lock. The lock is only touched when
    /// `use_lock` is set.
    pub async fn run_with_lock<L: AdvisoryLock>(&self, lock: L) -> RunOutcome {
        let span = info_span!(
            "job",
            label = %self.config.label,
            correlation_id = %self.ctx.correlation_id
        );
        self.execute(lock).instrument(span).await
    }

    async fn execute<L: AdvisoryLock>(&self, mut lock: L) -> RunOutcome {
        let config = self.config;

        if config.should_emit_start() {
            self.reporter.starting();
        }

        let guard = if config.use_lock {
            match lock::acquire(&mut lock, config.lock_wait_timeout).await {
                Ok(()) => Some(LockGuard::held(lock)),
                Err(err) => {
                    error!(error = %err, "could not lock; command not started");
                    return RunOutcome::not_started(err);
                }
            }
        } else {
            None
        };

        let mode = OutputMode::select(config.needs_output(), config.passthrough_output);
        let spec = match self.command_spec() {
            Some(spec) => spec,
            None => {
                let err = CronnerError::ConfigError("you must specify a command to run".into());
                return self.abandon(guard, err);
            }
        };

        let started = Instant::now();
        let process = exec::start(&spec, mode);

        let result = wait_with_watchdog(process.result, started, config.warn_after, |elapsed| {
            warn!(elapsed_secs = elapsed.as_secs(), "command still running");
            self.reporter.still_running(elapsed.as_secs());
        })
        .await;

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        let mut exit_code = result.as_ref().err().map_or(0, CronnerError::exit_code);
        let mut error = result.err();

        info!(exit_code, duration_ms, success = error.is_none(), "command finished");

        if let Some(guard) = guard {
            let path = guard.path().to_path_buf();
            if let Err(source) = guard.release() {
                let unlock = CronnerError::Unlock { path, source };
                if error.is_none() {
                    exit_code = INTERNAL_ERROR_CODE;
                    error = Some(unlock);
                } else {
                    error!(error = %unlock, "unlock failed after command failure");
                }
            }
        }

        self.reporter.run_metrics(duration_ms, exit_code);

        let output = process.output.take();
        let failed = error.is_some();

        if config.should_emit_completion(failed) {
            self.reporter
                .completed(exit_code, duration_ms, &output, error.as_ref());
        }

        let output_log = if failed && config.log_output_on_failure {
            self.persist_output(&output)
        } else {
            OutputLog::NotRequested
        };

        RunOutcome {
            exit_code,
            output,
            duration_ms,
            error,
            output_log,
        }
    }

    fn command_spec(&self) -> Option<CommandSpec> {
        let config = self.config;
        let spec = CommandSpec::from_argv(&config.command)?;

        let env = child_env(
            &self.ctx.correlation_id,
            config.event_group.as_deref(),
            config.metric_group.as_deref(),
            &config.namespace,
            &config.label,
        );
        Some(env.into_iter().fold(spec, |spec, (k, v)| spec.env(k, v)))
    }

    fn persist_output(&self, out: &[u8]) -> OutputLog {
        let path = self.config.output_log_path(&self.ctx.correlation_id);

        if output::write_output(&path, out, self.config.fallback_is_sensitive()) {
            debug!(path = %path.display(), "failure output saved");
            OutputLog::Written(path)
        } else {
            OutputLog::Failed(path)
        }
    }

    fn abandon<L: AdvisoryLock>(&self, guard: Option<LockGuard<L>>, err: CronnerError) -> RunOutcome {
        if let Some(guard) = guard {
            if let Err(e) = guard.release() {
                error!(error = %e, "unlock failed");
            }
        }
        RunOutcome::not_started(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use crate::emit::Event;
    use crate::errors::Result;

    #[derive(Default)]
    struct Sink {
        events: Mutex<Vec<Event>>,
        gauges: Mutex<Vec<(String, f64)>>,
    }

    impl NotificationEmitter for Sink {
        fn event(&self, event: &Event) -> Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    impl MetricsEmitter for Sink {
        fn timing(&self, _: &str, _: f64, _: &[String]) -> Result<()> {
            Ok(())
        }
        fn gauge(&self, name: &str, value: f64, _: &[String]) -> Result<()> {
            self.gauges.lock().unwrap().push((name.to_string(), value));
            Ok(())
        }
    }

    /// Always acquires; release fails and is counted.
    struct BrokenUnlock {
        path: PathBuf,
        releases: Arc<Mutex<usize>>,
    }

    impl AdvisoryLock for BrokenUnlock {
        fn try_acquire(&mut self) -> io::Result<bool> {
            Ok(true)
        }
        fn release(&mut self) -> io::Result<()> {
            *self.releases.lock().unwrap() += 1;
            Err(io::Error::other("disk on fire"))
        }
        fn path(&self) -> &Path {
            &self.path
        }
    }

    fn broken_lock() -> (BrokenUnlock, Arc<Mutex<usize>>) {
        let releases = Arc::new(Mutex::new(0));
        let lock = BrokenUnlock {
            path: PathBuf::from("/tmp/cronner-broken.lock"),
            releases: Arc::clone(&releases),
        };
        (lock, releases)
    }

    fn config(argv: &[&str]) -> JobConfig {
        let mut cfg = JobConfig::new("unit", argv.iter().map(|s| s.to_string()).collect());
        cfg.use_lock = true;
        cfg.emit_on_all_events = true;
        cfg
    }

    #[tokio::test]
    async fn unlock_failure_overrides_success() {
        let cfg = config(&["true"]);
        let ctx = RunContext::with_identity(&cfg, "id-1", "host");
        let sink = Sink::default();
        let (lock, releases) = broken_lock();

        let outcome = Orchestrator::new(&cfg, &ctx, &sink, &sink).run_with_lock(lock).await;

        assert_eq!(*releases.lock().unwrap(), 1);
        assert_eq!(outcome.exit_code, INTERNAL_ERROR_CODE);
        assert!(matches!(outcome.error, Some(CronnerError::Unlock { .. })));
        assert_eq!(
            sink.gauges.lock().unwrap().as_slice(),
            &[("unit.exit_code".to_string(), 200.0)]
        );

        let events = sink.events.lock().unwrap();
        let completion = events.last().unwrap();
        assert!(completion.title.starts_with("Cron unit failed in "));
        assert!(completion.body.contains("more: failed to unlock"));
    }

    #[tokio::test]
    async fn unlock_failure_does_not_mask_command_failure() {
        let cfg = config(&["sh", "-c", "exit 4"]);
        let ctx = RunContext::with_identity(&cfg, "id-2", "host");
        let sink = Sink::default();
        let (lock, releases) = broken_lock();

        let outcome = Orchestrator::new(&cfg, &ctx, &sink, &sink).run_with_lock(lock).await;

        assert_eq!(*releases.lock().unwrap(), 1);
        assert_eq!(outcome.exit_code, 4);
        assert!(matches!(outcome.error, Some(CronnerError::ProcessExit { code: 4 })));
    }

    #[tokio::test]
    async fn lock_is_ignored_when_disabled() {
        let mut cfg = config(&["true"]);
        cfg.use_lock = false;
        let ctx = RunContext::with_identity(&cfg, "id-3", "host");
        let sink = Sink::default();
        let (lock, releases) = broken_lock();

        let outcome = Orchestrator::new(&cfg, &ctx, &sink, &sink).run_with_lock(lock).await;

        assert!(outcome.succeeded());
        assert_eq!(*releases.lock().unwrap(), 0);
    }
}
