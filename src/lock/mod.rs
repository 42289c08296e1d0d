// src/lock/mod.rs

//! Per-label advisory locking.
//!
//! - [`AdvisoryLock`] is the try-acquire / release contract the orchestrator
//!   talks to.
//! - [`FileLock`] implements it with an exclusive `flock` on
//!   `{lock_dir}/cronner-{label}.lock` via `fs2`.
//! - [`wait`] holds the acquisition policy (fail fast or poll until a
//!   deadline).
//! - [`LockGuard`] owns an acquired lock and releases it on every exit path.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

pub mod wait;

pub use wait::{POLL_INTERVAL, acquire, acquire_with_interval};

/// A named, path-addressed mutual-exclusion primitive.
pub trait AdvisoryLock: Send {
    /// Non-blocking acquire.
    ///
    /// `Ok(false)` means somebody else holds the lock; `Err` means the path
    /// is unusable (missing directory, permissions, ...).
    fn try_acquire(&mut self) -> io::Result<bool>;

    /// Release a lock previously acquired with `try_acquire`.
    fn release(&mut self) -> io::Result<()>;

    fn path(&self) -> &Path;
}

/// Exclusive `flock`-based lock on a file.
///
/// The lock file is created on first use and never removed; only its lock
/// state matters.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
    file: Option<File>,
}

impl FileLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    fn open(&mut self) -> io::Result<&File> {
        if self.file.is_none() {
            let file = match OpenOptions::new().create(true).append(true).open(&self.path) {
                Ok(file) => file,
                // flock works on a read-only descriptor; someone else's lock
                // file is still usable.
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    OpenOptions::new().read(true).open(&self.path)?
                }
                Err(e) => return Err(e),
            };
            self.file = Some(file);
        }
        self.file
            .as_ref()
            .ok_or_else(|| io::Error::other("lock file handle missing"))
    }
}

impl AdvisoryLock for FileLock {
    fn try_acquire(&mut self) -> io::Result<bool> {
        let file = self.open()?;
        match FileExt::try_lock_exclusive(file) {
            Ok(()) => Ok(true),
            Err(e) if is_contended(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn release(&mut self) -> io::Result<()> {
        match self.file.as_ref() {
            Some(file) => FileExt::unlock(file),
            None => Err(io::Error::other("lock was never acquired")),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Owns an acquired lock.
///
/// Call [`LockGuard::release`] to release it and observe the result. If the
/// guard is dropped without that (early return, panic unwinding) the lock is
/// still released, best effort.
pub struct LockGuard<L: AdvisoryLock> {
    lock: L,
    held: bool,
}

impl<L: AdvisoryLock> LockGuard<L> {
    /// Wrap a lock that has already been acquired.
    pub fn held(lock: L) -> Self {
        Self { lock, held: true }
    }

    pub fn path(&self) -> &Path {
        self.lock.path()
    }

    pub fn release(mut self) -> io::Result<()> {
        self.held = false;
        self.lock.release()
    }
}

impl<L: AdvisoryLock> Drop for LockGuard<L> {
    fn drop(&mut self) {
        if !self.held {
            return;
        }
        debug!(path = %self.lock.path().display(), "releasing lock from drop");
        if let Err(e) = self.lock.release() {
            warn!(
                path = %self.lock.path().display(),
                error = %e,
                "failed to release lock while unwinding"
            );
        }
    }
}
