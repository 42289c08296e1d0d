// src/errors.rs

//! Crate-wide error type and exit-code conventions.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code reported when cronner itself failed to do its job (lock
/// problems, an unstartable command, a signal-terminated child, ...).
pub const INTERNAL_ERROR_CODE: i32 = 200;

#[derive(Error, Debug)]
pub enum CronnerError {
    #[error("{0}")]
    ConfigError(String),

    #[error("failed to obtain lock on '{}': locked by another process", .path.display())]
    LockContended { path: PathBuf },

    #[error("timeout exceeded ({secs}s) waiting for the file lock")]
    LockWaitTimeout { secs: u64 },

    #[error("failed to obtain lock on '{}': {source}", .path.display())]
    LockInit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to unlock: '{}': {source}", .path.display())]
    Unlock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("exit status {code}")]
    ProcessExit { code: i32 },

    #[error("command terminated by signal {signal}")]
    ProcessSignal { signal: i32 },

    #[error("failed to start command '{program}': {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for command: {0}")]
    ProcessWait(#[source] std::io::Error),

    #[error("flagrant error: output file '{}' already exists", .path.display())]
    OutputExists { path: PathBuf },

    #[error("error opening file '{}' to save command output: {source}", .path.display())]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error setting permissions (0400) on file '{}': {source}", .path.display())]
    OutputPermissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing to file '{}': {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "error writing to file '{}': number of bytes written not equal to output (total: {total}, written: {written})",
        .path.display()
    )]
    OutputShortWrite {
        path: PathBuf,
        total: usize,
        written: usize,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CronnerError {
    /// Exit code this error maps to: the child's own status for a plain
    /// non-zero exit, [`INTERNAL_ERROR_CODE`] for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CronnerError::ProcessExit { code } => *code,
            _ => INTERNAL_ERROR_CODE,
        }
    }

    /// True when the wrapped command ran and failed on its own, as opposed to
    /// cronner failing around it.
    pub fn is_process_failure(&self) -> bool {
        matches!(
            self,
            CronnerError::ProcessExit { .. } | CronnerError::ProcessSignal { .. }
        )
    }

    /// True for the lock-acquisition family of errors. None of these ever
    /// let the command start.
    pub fn is_lock_failure(&self) -> bool {
        matches!(
            self,
            CronnerError::LockContended { .. }
                | CronnerError::LockWaitTimeout { .. }
                | CronnerError::LockInit { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CronnerError>;
