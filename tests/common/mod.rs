#![allow(dead_code)]

use std::error::Error;

use cronner::config::JobConfig;
use cronner::engine::{Orchestrator, RunContext, RunOutcome};
use cronner_test_utils::recorder::RecordingEmitter;

pub use cronner_test_utils::builders::JobConfigBuilder;
pub use cronner_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn Error>>;

/// Run `config` once against a fresh recorder.
pub async fn run_job(config: &JobConfig) -> (RunOutcome, RecordingEmitter, RunContext) {
    init_tracing();
    let ctx = RunContext::with_identity(
        config,
        cronner::engine::new_correlation_id(),
        "testhost",
    );
    let rec = RecordingEmitter::new();
    let outcome = Orchestrator::new(config, &ctx, &rec, &rec).run().await;
    (outcome, rec, ctx)
}
