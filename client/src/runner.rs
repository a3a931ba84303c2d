//! Spawn capability: runs a process descriptor to completion.

use std::process::Stdio;

use builder::{DescriptorParts, ProcessDescriptor, ProcessInput};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::instrument;

/// Errors surfaced while spawning or supervising a child process.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("process did not exit within {limit:?} and was killed")]
    TimedOut { limit: std::time::Duration },
    #[error("process run was cancelled")]
    Cancelled,
    #[error("process i/o failed")]
    Io(#[from] std::io::Error),
}

/// Exit status and captured streams of a finished process.
///
/// Both streams are empty when the descriptor disabled output capture.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: std::process::ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs a descriptor to completion, honoring its working directory,
/// environment overlay, input source, timeout and capture policy.
#[instrument(skip(descriptor), fields(program = %descriptor.program()))]
pub async fn run(descriptor: ProcessDescriptor) -> Result<ProcessOutput, RunError> {
    run_inner(descriptor, None).await
}

/// Like [`run`], but also kills the child when the token fires.
///
/// Cancelling a token more than once, or after the run finished, is
/// harmless; cancellation never blocks once requested.
#[instrument(skip(descriptor, cancel), fields(program = %descriptor.program()))]
pub async fn run_cancellable(
    descriptor: ProcessDescriptor,
    cancel: &tokio_util::sync::CancellationToken,
) -> Result<ProcessOutput, RunError> {
    run_inner(descriptor, Some(cancel)).await
}

enum WaitOutcome {
    Finished(std::io::Result<ProcessOutput>),
    TimedOut(std::time::Duration),
    Cancelled,
}

async fn run_inner(
    descriptor: ProcessDescriptor,
    cancel: Option<&tokio_util::sync::CancellationToken>,
) -> Result<ProcessOutput, RunError> {
    let DescriptorParts {
        argv,
        working_directory,
        environment,
        input,
        timeout,
        capture_output,
    } = descriptor.into_parts();

    let mut argv = argv.into_iter();
    let Some(program) = argv.next() else {
        return Err(RunError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty argument vector",
        )));
    };

    let mut command = tokio::process::Command::new(&program);
    command.args(argv);
    if let Some(directory) = working_directory {
        command.current_dir(directory);
    }
    for (name, value) in environment {
        match value {
            Some(value) => {
                command.env(name, value);
            }
            None => {
                command.env_remove(name);
            }
        }
    }
    command.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    let stream = if capture_output { Stdio::piped } else { Stdio::null };
    command.stdout(stream()).stderr(stream());
    command.kill_on_drop(true);

    tracing::debug!("spawning {:?}", program);
    let mut child = command.spawn().map_err(|source| RunError::Spawn {
        program: program.clone(),
        source,
    })?;

    // stdin is written from its own task so a full stdout pipe can never
    // deadlock against an unread stdin buffer
    let stdin_task = match (input, child.stdin.take()) {
        (Some(input), Some(mut stdin)) => Some(tokio::spawn(async move {
            match input {
                ProcessInput::Bytes(bytes) => stdin.write_all(&bytes).await?,
                ProcessInput::Reader(mut reader) => {
                    tokio::io::copy(&mut reader, &mut stdin).await?;
                }
            }
            stdin.shutdown().await
        })),
        _ => None,
    };

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let outcome = {
        let wait_fut = async {
            let (status, stdout, stderr) =
                tokio::try_join!(child.wait(), drain(stdout_pipe), drain(stderr_pipe))?;
            Ok::<_, std::io::Error>(ProcessOutput {
                status,
                stdout,
                stderr,
            })
        };
        tokio::pin!(wait_fut);

        let guarded = async {
            match cancel {
                Some(token) => tokio::select! {
                    result = wait_fut.as_mut() => WaitOutcome::Finished(result),
                    () = token.cancelled() => WaitOutcome::Cancelled,
                },
                None => WaitOutcome::Finished(wait_fut.as_mut().await),
            }
        };

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(outcome) => outcome,
                Err(_) => WaitOutcome::TimedOut(limit),
            },
            None => guarded.await,
        }
    };

    match outcome {
        WaitOutcome::Finished(result) => {
            let output = result?;
            if let Some(task) = stdin_task {
                match task.await {
                    Ok(Ok(())) => {}
                    // the child exiting before consuming its input is fine
                    Ok(Err(error)) if error.kind() == std::io::ErrorKind::BrokenPipe => {}
                    Ok(Err(error)) => return Err(RunError::Io(error)),
                    Err(join_error) => {
                        return Err(RunError::Io(std::io::Error::other(join_error)))
                    }
                }
            }
            tracing::debug!("{:?} exited with {:?}", program, output.status);
            Ok(output)
        }
        WaitOutcome::TimedOut(limit) => {
            if let Some(task) = stdin_task {
                task.abort();
            }
            tracing::info!("{:?} exceeded its {:?} timeout, killing it", program, limit);
            terminate(&mut child).await;
            Err(RunError::TimedOut { limit })
        }
        WaitOutcome::Cancelled => {
            if let Some(task) = stdin_task {
                task.abort();
            }
            tracing::info!("run of {:?} cancelled, killing it", program);
            terminate(&mut child).await;
            Err(RunError::Cancelled)
        }
    }
}

async fn drain(pipe: Option<impl tokio::io::AsyncRead + Unpin>) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

/// Kills and reaps the child; signalling an already-exited child is fine.
async fn terminate(child: &mut tokio::process::Child) {
    if let Err(error) = child.start_kill() {
        tracing::debug!("failed to signal child process: {}", error);
    }
    if let Err(error) = child.wait().await {
        tracing::debug!("failed to reap child process: {}", error);
    }
}
