// src/lock/wait.rs

//! Lock acquisition policy: fail fast, or poll until a deadline.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use super::AdvisoryLock;
use crate::errors::{CronnerError, Result};

/// How often a waiting run retries the lock.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Acquire `lock`, waiting at most `wait` (zero = don't wait at all).
pub async fn acquire<L: AdvisoryLock>(lock: &mut L, wait: Duration) -> Result<()> {
    acquire_with_interval(lock, wait, POLL_INTERVAL).await
}

/// [`acquire`] with a custom poll interval.
///
/// - First attempt: an error is fatal (`LockInit`); contention with no wait
///   configured is `LockContended`.
/// - While waiting: errors and contention are both retried. The deadline is
///   checked before every retry so the timeout fires on time rather than one
///   interval late.
pub async fn acquire_with_interval<L: AdvisoryLock>(
    lock: &mut L,
    wait: Duration,
    interval: Duration,
) -> Result<()> {
    let path = lock.path().to_path_buf();

    match lock.try_acquire() {
        Ok(true) => {
            debug!(path = %path.display(), "lock acquired");
            return Ok(());
        }
        Ok(false) if wait.is_zero() => return Err(CronnerError::LockContended { path }),
        Ok(false) => {}
        Err(source) => return Err(CronnerError::LockInit { path, source }),
    }

    debug!(
        path = %path.display(),
        wait_secs = wait.as_secs(),
        "lock held by another process; waiting"
    );

    let deadline = Instant::now() + wait;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return Err(CronnerError::LockWaitTimeout {
                secs: wait.as_secs(),
            });
        }

        sleep(interval.min(deadline - now)).await;

        match lock.try_acquire() {
            Ok(true) => {
                debug!(path = %path.display(), "lock acquired after waiting");
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "lock attempt failed; retrying");
            }
        }
    }
}
