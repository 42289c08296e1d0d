// src/exec/process.rs

//! Launch the wrapped command and report its single terminal result.

use std::process::{ExitStatus, Stdio};

use anyhow::anyhow;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::capture::{Echo, OutputMode, SharedBuffer, pump};
use crate::errors::{CronnerError, Result};

/// Program, argv and extra environment for the child.
///
/// Working directory and the rest of the environment are inherited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Split an argv vector into program + args. `None` when empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            env: Vec::new(),
        })
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn build(&self, mode: OutputMode) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null());

        match mode {
            OutputMode::Discard => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
            OutputMode::Capture | OutputMode::Tee => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Passthrough => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }
        cmd
    }
}

/// A launched command.
///
/// `result` yields exactly one value: `Ok(())` for exit status 0, an error
/// otherwise. `output` fills up while the child runs and is complete once
/// `result` has been delivered.
#[derive(Debug)]
pub struct RunningProcess {
    pub result: oneshot::Receiver<Result<()>>,
    pub output: SharedBuffer,
}

/// Launch `spec` in the background without blocking the caller.
///
/// A command that cannot be started is reported through `result`, not
/// returned here.
pub fn start(spec: &CommandSpec, mode: OutputMode) -> RunningProcess {
    let (tx, rx) = oneshot::channel();
    let output = SharedBuffer::default();

    let cmd = spec.build(mode);
    let program = spec.program.clone();
    let sink = output.clone();

    tokio::spawn(async move {
        let result = run_to_completion(cmd, program, mode, sink).await;
        if tx.send(result).is_err() {
            debug!("process result receiver dropped before completion");
        }
    });

    RunningProcess { result: rx, output }
}

async fn run_to_completion(
    mut cmd: Command,
    program: String,
    mode: OutputMode,
    sink: SharedBuffer,
) -> Result<()> {
    info!(program = %program, ?mode, "starting command");

    let mut child = cmd
        .spawn()
        .map_err(|source| CronnerError::ProcessSpawn { program, source })?;

    let mut pumps = Vec::new();
    if mode.captures() {
        let (out_echo, err_echo) = match mode {
            OutputMode::Tee => (Echo::Stdout, Echo::Stderr),
            _ => (Echo::None, Echo::None),
        };
        if let Some(stdout) = child.stdout.take() {
            pumps.push(tokio::spawn(pump(stdout, sink.clone(), out_echo)));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(tokio::spawn(pump(stderr, sink.clone(), err_echo)));
        }
    }

    let status = child.wait().await.map_err(CronnerError::ProcessWait)?;

    // Drain whatever is still in the pipes so the captured output is whole.
    for handle in pumps {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "reading command output failed"),
            Err(e) => warn!(error = %e, "output reader task failed"),
        }
    }

    debug!(%status, captured = sink.len(), "command exited");
    classify(status)
}

/// Map an exit status onto the run's terminal result.
pub fn classify(status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(CronnerError::ProcessExit { code });
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(CronnerError::ProcessSignal { signal });
        }
    }

    Err(CronnerError::Other(anyhow!(
        "command terminated abnormally: {status}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(argv: &[&str]) -> CommandSpec {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        CommandSpec::from_argv(&argv).unwrap()
    }

    #[test]
    fn argv_split() {
        let s = spec(&["/bin/echo", "a b", "c"]);
        assert_eq!(s.program, "/bin/echo");
        assert_eq!(s.args, vec!["a b", "c"]);
        assert!(CommandSpec::from_argv(&[]).is_none());
    }

    #[tokio::test]
    async fn success_is_ok_and_output_is_captured() {
        let p = start(&spec(&["sh", "-c", "echo out; echo err 1>&2"]), OutputMode::Capture);
        p.result.await.unwrap().unwrap();

        let out = String::from_utf8(p.output.take()).unwrap();
        assert!(out.contains("out\n"));
        assert!(out.contains("err\n"));
    }

    #[tokio::test]
    async fn nonzero_exit_keeps_code() {
        let p = start(&spec(&["sh", "-c", "exit 3"]), OutputMode::Discard);
        let err = p.result.await.unwrap().unwrap_err();
        assert!(matches!(err, CronnerError::ProcessExit { code: 3 }));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn discard_captures_nothing() {
        let p = start(&spec(&["echo", "something"]), OutputMode::Discard);
        p.result.await.unwrap().unwrap();
        assert!(p.output.is_empty());
    }

    #[tokio::test]
    async fn missing_program_is_reported_through_the_channel() {
        let p = start(&spec(&["/nonexistent/cronner-test-binary"]), OutputMode::Capture);
        let err = p.result.await.unwrap().unwrap_err();
        assert!(matches!(err, CronnerError::ProcessSpawn { .. }));
        assert_eq!(err.exit_code(), crate::errors::INTERNAL_ERROR_CODE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn signal_termination_is_not_an_exit_code() {
        let p = start(&spec(&["sh", "-c", "kill -TERM $$"]), OutputMode::Discard);
        let err = p.result.await.unwrap().unwrap_err();
        assert!(matches!(err, CronnerError::ProcessSignal { signal: 15 }));
        assert_eq!(err.exit_code(), crate::errors::INTERNAL_ERROR_CODE);
        assert!(err.is_process_failure());
    }

    #[tokio::test]
    async fn extra_env_reaches_the_child() {
        let s = spec(&["sh", "-c", "printf %s \"$CRONNER_TEST_VAR\""]).env("CRONNER_TEST_VAR", "hi");
        let p = start(&s, OutputMode::Capture);
        p.result.await.unwrap().unwrap();
        assert_eq!(p.output.take(), b"hi");
    }
}
