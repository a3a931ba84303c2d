//! SCP front-end: copies files to and from the remote host through the
//! external scp binary.

use anyhow::Context;
use builder::{build_scp_prefix, remote_path_prefix, ClientConfiguration, ProcessBuilder};

use crate::runner::{self, ProcessOutput};

/// Copies files over one configured connection.
#[derive(Debug)]
pub struct ScpClient<C> {
    config: C,
}

impl<C: ClientConfiguration> ScpClient<C> {
    pub fn new(config: C) -> Self {
        ScpClient { config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Renders a remote path argument in the `user@host:path` form the scp
    /// binary expects. The scp prefix itself carries no address token.
    pub fn remote_path(&self, path: &str) -> String {
        format!("{}{path}", remote_path_prefix(&self.config))
    }

    /// A builder pre-seeded with the scp invocation prefix and the given
    /// path arguments (already in their final local/remote form).
    pub fn command<I>(&self, arguments: I) -> ProcessBuilder
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut process = ProcessBuilder::new();
        process
            .set_prefix(build_scp_prefix(&self.config))
            .set_arguments(arguments);
        process
    }

    /// Copies a local path to a path on the remote host.
    pub async fn upload(&self, local: &str, remote: &str) -> anyhow::Result<ProcessOutput> {
        let descriptor = self
            .command([local.to_string(), self.remote_path(remote)])
            .build()
            .context("assembling scp invocation")?;
        tracing::debug!("uploading {} to {}:{}", local, self.config.hostname(), remote);
        runner::run(descriptor)
            .await
            .with_context(|| format!("running scp to {}", self.config.hostname()))
    }

    /// Copies a path on the remote host to a local path.
    pub async fn download(&self, remote: &str, local: &str) -> anyhow::Result<ProcessOutput> {
        let descriptor = self
            .command([self.remote_path(remote), local.to_string()])
            .build()
            .context("assembling scp invocation")?;
        tracing::debug!(
            "downloading {}:{} to {}",
            self.config.hostname(),
            remote,
            local
        );
        runner::run(descriptor)
            .await
            .with_context(|| format!("running scp to {}", self.config.hostname()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder::{ClientConfig, OptionSet};

    fn client() -> ScpClient<ClientConfig> {
        let mut config = ClientConfig::new("host1").with_username("bob");
        config.scp_options = OptionSet::new().with_flag("r");
        ScpClient::new(config)
    }

    #[test]
    fn upload_shape_embeds_the_remote_address_in_the_path() {
        let client = client();
        let descriptor = client
            .command(["data/".to_string(), client.remote_path("backup/")])
            .build()
            .unwrap();
        assert_eq!(
            descriptor.argv(),
            ["scp", "-r", "data/", "bob@host1:backup/"]
        );
    }

    #[test]
    fn remote_path_omits_the_user_when_none_is_configured() {
        let client = ScpClient::new(ClientConfig::new("host1"));
        assert_eq!(client.remote_path("a.txt"), "host1:a.txt");
    }
}
