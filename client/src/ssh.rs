//! SSH front-end: runs commands on the remote host through the external
//! ssh binary.

use anyhow::Context;
use builder::{build_ssh_prefix, ClientConfiguration, ProcessBuilder};

use crate::runner::{self, ProcessOutput};

/// Runs remote commands over one configured connection.
#[derive(Debug)]
pub struct SshClient<C> {
    config: C,
}

impl<C: ClientConfiguration> SshClient<C> {
    pub fn new(config: C) -> Self {
        SshClient { config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// A builder pre-seeded with the ssh invocation prefix and the given
    /// remote command tokens. Callers needing a non-default timeout,
    /// environment or input adjust the builder before building and handing
    /// the descriptor to [`runner::run`].
    pub fn command<I>(&self, arguments: I) -> ProcessBuilder
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut process = ProcessBuilder::new();
        process
            .set_prefix(build_ssh_prefix(&self.config))
            .set_arguments(arguments);
        process
    }

    /// Runs one remote command with default process settings and returns
    /// its exit status and captured output. The tokens are passed to ssh
    /// verbatim; nothing here interprets the remote command.
    pub async fn execute<I>(&self, arguments: I) -> anyhow::Result<ProcessOutput>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let descriptor = self
            .command(arguments)
            .build()
            .context("assembling ssh invocation")?;
        tracing::debug!("running remote command on {}", self.config.hostname());
        runner::run(descriptor)
            .await
            .with_context(|| format!("running ssh to {}", self.config.hostname()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder::{ClientConfig, OptionSet};

    fn client() -> SshClient<ClientConfig> {
        let mut config = ClientConfig::new("host1").with_username("bob");
        config.protocol_options = OptionSet::new().with_named("BatchMode", "yes");
        SshClient::new(config)
    }

    #[test]
    fn command_places_task_arguments_after_the_prefix() {
        let descriptor = client().command(["ls", "-la"]).build().unwrap();
        assert_eq!(
            descriptor.argv(),
            ["ssh", "-o", "BatchMode=yes", "bob@host1", "ls", "-la"]
        );
    }

    #[test]
    fn command_builder_accepts_per_task_settings() {
        let mut process = client().command(["true"]);
        process.set_timeout(Some(1.5)).unwrap();
        let descriptor = process.build().unwrap();
        assert_eq!(
            descriptor.timeout(),
            Some(std::time::Duration::from_millis(1500))
        );
    }
}
