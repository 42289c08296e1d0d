// tests/failure_output.rs

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;

use common::{JobConfigBuilder, TestResult, run_job};
use cronner::engine::OutputLog;
use tempfile::tempdir;

#[tokio::test]
async fn test_failure_output_is_saved_read_only() -> TestResult {
    let dir = tempdir()?;
    let cfg = JobConfigBuilder::new("broken", &["sh", "-c", "echo out; echo err >&2; exit 1"])
        .in_dir(dir.path())
        .log_fail()
        .build();

    let (outcome, _, ctx) = run_job(&cfg).await;
    let expected = dir
        .path()
        .join(format!("broken-{}.out", ctx.correlation_id));

    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.output_log, OutputLog::Written(expected.clone()));

    let saved = fs::read(&expected)?;
    assert_eq!(saved, outcome.output);
    let text = String::from_utf8(saved)?;
    assert!(text.contains("out\n") && text.contains("err\n"));

    let mode = fs::metadata(&expected)?.permissions().mode() & 0o777;
    assert_eq!(mode, 0o400);
    Ok(())
}

#[tokio::test]
async fn test_success_writes_nothing() -> TestResult {
    let dir = tempdir()?;
    let cfg = JobConfigBuilder::new("fine", &["sh", "-c", "echo ok"])
        .in_dir(dir.path())
        .log_fail()
        .build();

    let (outcome, _, _) = run_job(&cfg).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.output_log, OutputLog::NotRequested);
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unwritable_log_dir_is_flagged() -> TestResult {
    let dir = tempdir()?;
    let mut cfg = JobConfigBuilder::new("lost", &["false"])
        .in_dir(dir.path())
        .log_fail()
        .sensitive()
        .build();
    cfg.output_log_dir = dir.path().join("does-not-exist");

    let (outcome, _, _) = run_job(&cfg).await;

    assert_eq!(outcome.exit_code, 1);
    assert!(matches!(outcome.output_log, OutputLog::Failed(_)));
    Ok(())
}

#[tokio::test]
async fn test_passthrough_failure_is_not_printed_again() -> TestResult {
    let dir = tempdir()?;
    let mut cfg = JobConfigBuilder::new("echoed", &["sh", "-c", "echo SECRET; exit 1"])
        .in_dir(dir.path())
        .passthrough()
        .log_fail()
        .build();
    cfg.output_log_dir = dir.path().join("does-not-exist");

    assert!(!cfg.sensitive_output);
    assert!(cfg.fallback_is_sensitive());

    let (outcome, _, _) = run_job(&cfg).await;

    assert_eq!(outcome.exit_code, 1);
    assert!(matches!(outcome.output_log, OutputLog::Failed(_)));
    Ok(())
}

#[test]
fn test_fallback_prints_output_unless_sensitive() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("taken.out");
    fs::write(&path, b"already here")?;

    let mut stderr = Vec::new();
    assert!(!cronner::output::write_output_with_fallback(&path, b"payload", false, &mut stderr));
    let shown = String::from_utf8(stderr)?;
    assert!(shown.contains("already exists"));
    assert!(shown.ends_with("here is the output in hopes you are looking here:\n\npayload"));

    let mut stderr = Vec::new();
    assert!(!cronner::output::write_output_with_fallback(&path, b"secret", true, &mut stderr));
    let shown = String::from_utf8(stderr)?;
    assert!(!shown.contains("secret"));
    Ok(())
}
