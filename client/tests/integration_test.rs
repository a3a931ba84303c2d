#![cfg(unix)]

use anyhow::Result;
use builder::{ProcessBuilder, ProcessInput};
use client::{run, run_cancellable, RunError};

#[tokio::test]
async fn echoes_in_memory_stdin_through_cat() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process.set_prefix("cat").set_input("abc");
    let output = run(process.build()?).await?;
    assert!(output.success());
    assert_eq!(output.stdout, b"abc");
    assert!(output.stderr.is_empty());
    Ok(())
}

#[tokio::test]
async fn streams_reader_stdin_lazily() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process
        .set_prefix("cat")
        .set_input(ProcessInput::reader(std::io::Cursor::new(
            b"streamed payload".to_vec(),
        )));
    let output = run(process.build()?).await?;
    assert_eq!(output.stdout, b"streamed payload");
    Ok(())
}

#[tokio::test]
async fn captures_stderr_separately() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process.set_prefix(vec!["sh", "-c", "printf out; printf err >&2"]);
    let output = run(process.build()?).await?;
    assert_eq!(output.stdout, b"out");
    assert_eq!(output.stderr, b"err");
    Ok(())
}

#[tokio::test]
async fn disabled_capture_retains_nothing() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process
        .set_prefix(vec!["sh", "-c", "echo hi; echo err >&2"])
        .disable_output_capture();
    let output = run(process.build()?).await?;
    assert!(output.success());
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
    Ok(())
}

#[tokio::test]
async fn reports_the_exit_code() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process.set_prefix(vec!["sh", "-c", "exit 3"]);
    let output = run(process.build()?).await?;
    assert!(!output.success());
    assert_eq!(output.status.code(), Some(3));
    Ok(())
}

#[tokio::test]
async fn applies_the_working_directory() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process
        .set_prefix(vec!["sh", "-c", "pwd"])
        .set_working_directory(Some("/"));
    let output = run(process.build()?).await?;
    assert_eq!(output.stdout_lossy().trim(), "/");
    Ok(())
}

#[tokio::test]
async fn overlay_values_reach_the_child_environment() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process
        .set_prefix(vec!["sh", "-c", "printf %s \"$SSH_TOOLS_TEST_VAR\""])
        .set_environment_variable("SSH_TOOLS_TEST_VAR", Some("overlaid".to_string()));
    let output = run(process.build()?).await?;
    assert_eq!(output.stdout_lossy(), "overlaid");
    Ok(())
}

#[tokio::test]
async fn unset_marker_removes_the_inherited_variable() -> Result<()> {
    // ${HOME-__absent__} expands to the fallback only when the variable is
    // truly unset; an empty-string pass-through would print nothing.
    let mut process = ProcessBuilder::new();
    process
        .set_prefix(vec!["sh", "-c", "printf %s \"${HOME-__absent__}\""])
        .set_environment_variable("HOME", None);
    let output = run(process.build()?).await?;
    assert_eq!(output.stdout_lossy(), "__absent__");
    Ok(())
}

#[tokio::test]
async fn kills_the_child_when_the_timeout_elapses() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process.set_prefix(vec!["sleep", "5"]);
    process.set_timeout(Some(0.2))?;
    let started = std::time::Instant::now();
    let error = run(process.build()?).await.unwrap_err();
    assert!(matches!(error, RunError::TimedOut { .. }));
    assert!(started.elapsed() < std::time::Duration::from_secs(4));
    Ok(())
}

#[tokio::test]
async fn cancellation_kills_the_child_and_is_idempotent() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process.set_prefix(vec!["sleep", "5"]);
    process.set_timeout(None)?;

    let token = tokio_util::sync::CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        canceller.cancel();
        canceller.cancel();
    });

    let error = run_cancellable(process.build()?, &token)
        .await
        .unwrap_err();
    assert!(matches!(error, RunError::Cancelled));

    // cancelling after completion must also be harmless
    token.cancel();
    Ok(())
}

#[tokio::test]
async fn missing_binaries_fail_at_spawn() -> Result<()> {
    let mut process = ProcessBuilder::new();
    process.set_prefix("ssh-tools-test-no-such-binary");
    let error = run(process.build()?).await.unwrap_err();
    match error {
        RunError::Spawn { program, .. } => {
            assert_eq!(program, "ssh-tools-test-no-such-binary");
        }
        other => panic!("expected a spawn error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn large_stdin_does_not_deadlock_against_stdout() -> Result<()> {
    // 4 MiB through cat exceeds any default pipe buffer in both directions.
    let payload = vec![b'x'; 4 * 1024 * 1024];
    let mut process = ProcessBuilder::new();
    process
        .set_prefix("cat")
        .set_input(bytes::Bytes::from(payload.clone()));
    let output = run(process.build()?).await?;
    assert_eq!(output.stdout.len(), payload.len());
    Ok(())
}
