//! Client front-ends and the spawn capability for ssh-tools process
//! descriptors.
//!
//! [`runner`] turns a [`builder::ProcessDescriptor`] into a finished child
//! process: it applies the environment overlay and working directory, pipes
//! the configured input into stdin from its own task, drains or discards
//! stdout/stderr per the capture policy, and enforces the timeout by
//! killing the child. [`ssh::SshClient`] and [`scp::ScpClient`] sit on top
//! and assemble complete invocations from a connection configuration.

pub mod runner;
pub mod scp;
pub mod ssh;

pub use runner::{run, run_cancellable, ProcessOutput, RunError};
pub use scp::ScpClient;
pub use ssh::SshClient;
