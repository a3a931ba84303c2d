//! Fixed leading argument sequences for ssh and scp invocations.
//!
//! These are pure functions of a [`ClientConfiguration`]; front-ends call
//! them once per task to seed a
//! [`ProcessBuilder`](crate::process::ProcessBuilder) prefix before
//! appending task-specific arguments.

use crate::config::ClientConfiguration;
use crate::options::{option_tokens, ssh_option_tokens};

/// Leading argument sequence for an ssh invocation:
/// `<ssh-binary> <-o opt=val>* <-flag val>* <user@host|host>`.
pub fn build_ssh_prefix(config: &impl ClientConfiguration) -> Vec<String> {
    let mut prefix = vec![config.ssh_binary().to_string()];
    prefix.extend(ssh_option_tokens(config.protocol_options()));
    prefix.extend(option_tokens(config.process_options()));
    prefix.push(address_token(config));
    prefix
}

/// Leading argument sequence for an scp invocation:
/// `<scp-binary> <-flag val>* <-scp-flag val>*`.
///
/// No host or address token: remote path arguments appended later must
/// embed `user@host:` themselves, via [`remote_path_prefix`].
pub fn build_scp_prefix(config: &impl ClientConfiguration) -> Vec<String> {
    let mut prefix = vec![config.scp_binary().to_string()];
    prefix.extend(option_tokens(config.process_options()));
    prefix.extend(option_tokens(config.scp_options()));
    prefix
}

/// The `user@host:` (or `host:`) prefix of a remote scp path argument.
pub fn remote_path_prefix(config: &impl ClientConfiguration) -> String {
    match config.username() {
        Some(user) => format!("{user}@{}:", config.hostname()),
        None => format!("{}:", config.hostname()),
    }
}

fn address_token(config: &impl ClientConfiguration) -> String {
    match config.username() {
        Some(user) => format!("{user}@{}", config.hostname()),
        None => config.hostname().to_string(),
    }
}
