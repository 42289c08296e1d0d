//! Shared helpers for cronner's integration tests.
//!
//! - [`builders`]: `JobConfigBuilder` for concise config setup.
//! - [`recorder`]: an emitter that records events and metrics in order.

pub mod builders;
pub mod recorder;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for one orchestrated run in tests. Lock waits and watchdog
/// runs take a few seconds of real time.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// Install a test-writer subscriber once per test binary.
///
/// Output is only shown for failing tests; set `RUST_LOG=cronner=debug` to
/// see the orchestrator's spans.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it outlives [`RUN_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(RUN_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("run did not finish within {RUN_TIMEOUT:?}"),
    }
}
