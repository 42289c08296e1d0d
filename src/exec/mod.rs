// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs the wrapped command with `tokio::process::Command` and hands the
//! orchestrator a one-shot receiver for its terminal result.
//!
//! - [`capture`] decides how stdout/stderr are wired and owns the shared
//!   output buffer.
//! - [`process`] launches the child, drains its pipes and classifies the
//!   exit status.

pub mod capture;
pub mod process;

pub use capture::{OutputMode, SharedBuffer};
pub use process::{CommandSpec, RunningProcess, classify, start};
