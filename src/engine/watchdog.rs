// src/engine/watchdog.rs

use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::errors::{CronnerError, Result};

/// Wait for the process result, calling `on_tick(elapsed)` every
/// `warn_after` while it is still running.
///
/// A zero `warn_after` waits on the result alone. The select is biased
/// towards the result so a tick that becomes ready together with completion
/// is dropped, and no tick is handled once the result has been seen.
pub async fn wait_with_watchdog<F>(
    mut result: oneshot::Receiver<Result<()>>,
    started: Instant,
    warn_after: Duration,
    mut on_tick: F,
) -> Result<()>
where
    F: FnMut(Duration),
{
    if warn_after.is_zero() {
        return flatten(result.await);
    }

    let mut ticker = interval_at(started + warn_after, warn_after);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            res = &mut result => return flatten(res),

            _ = ticker.tick() => on_tick(started.elapsed()),
        }
    }
}

fn flatten(res: std::result::Result<Result<()>, oneshot::error::RecvError>) -> Result<()> {
    res.unwrap_or_else(|_| {
        Err(CronnerError::Other(anyhow!(
            "process monitor ended without reporting a result"
        )))
    })
}
