//! Connection configuration consumed by the prefix assembler.

use crate::options::OptionSet;

/// Read-only view of one connection's configuration.
///
/// The prefix assembler only needs accessors; front-ends are free to back
/// this with whatever configuration source they have (the bundled
/// [`ClientConfig`] struct, a parsed config file, a test stub).
pub trait ClientConfiguration {
    /// Path or name of the `ssh` binary.
    fn ssh_binary(&self) -> &str;

    /// Path or name of the `scp` binary.
    fn scp_binary(&self) -> &str;

    /// Generic process-level flags, passed to both binaries.
    fn process_options(&self) -> &OptionSet;

    /// `-o key=value` protocol options for the `ssh` binary.
    fn protocol_options(&self) -> &OptionSet;

    /// Flags specific to the `scp` binary.
    fn scp_options(&self) -> &OptionSet;

    fn hostname(&self) -> &str;

    fn username(&self) -> Option<&str>;
}

/// Concrete connection configuration with sensible binary defaults.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub ssh_binary: String,
    pub scp_binary: String,
    pub process_options: OptionSet,
    pub protocol_options: OptionSet,
    pub scp_options: OptionSet,
    pub hostname: String,
    pub username: Option<String>,
}

impl ClientConfig {
    pub fn new(hostname: impl Into<String>) -> Self {
        ClientConfig {
            ssh_binary: "ssh".to_string(),
            scp_binary: "scp".to_string(),
            process_options: OptionSet::new(),
            protocol_options: OptionSet::new(),
            scp_options: OptionSet::new(),
            hostname: hostname.into(),
            username: None,
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

impl ClientConfiguration for ClientConfig {
    fn ssh_binary(&self) -> &str {
        &self.ssh_binary
    }

    fn scp_binary(&self) -> &str {
        &self.scp_binary
    }

    fn process_options(&self) -> &OptionSet {
        &self.process_options
    }

    fn protocol_options(&self) -> &OptionSet {
        &self.protocol_options
    }

    fn scp_options(&self) -> &OptionSet {
        &self.scp_options
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}
