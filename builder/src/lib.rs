//! Argument-vector assembly for external `ssh` and `scp` binaries.
//!
//! Two layers cooperate here: [`process::ProcessBuilder`] is a generic
//! accumulator for a command's prefix, options, positional arguments and
//! process settings, and [`prefix`] knows the option syntax of the `ssh` and
//! `scp` tools well enough to produce their fixed leading argument
//! sequences. A front-end seeds the builder with a prefix from the
//! assembler, appends its task arguments, and calls
//! [`process::ProcessBuilder::build`] to obtain an immutable
//! [`process::ProcessDescriptor`] ready to hand to a spawn capability.
//!
//! Nothing in this crate touches the OS; building a descriptor is a pure
//! in-memory operation.

pub mod config;
pub mod options;
pub mod prefix;
pub mod process;

pub use config::{ClientConfig, ClientConfiguration};
pub use options::{OptionEntry, OptionSet};
pub use prefix::{build_scp_prefix, build_ssh_prefix, remote_path_prefix};
pub use process::{
    BuildError, DescriptorParts, Prefix, ProcessBuilder, ProcessDescriptor, ProcessInput,
    DEFAULT_TIMEOUT_SECS,
};
