//! Generic process builder: accumulates argv parts and process settings,
//! then materializes an immutable descriptor ready to hand to a spawner.

use bytes::Bytes;

/// Timeout applied to freshly created builders, in seconds.
///
/// Kept as an explicit constant (not a mutable global) so tests and callers
/// can see and override it per builder via
/// [`ProcessBuilder::set_timeout`].
pub const DEFAULT_TIMEOUT_SECS: f64 = 60.0;

/// Errors raised while configuring or finalizing a process.
///
/// Every failure is raised at the offending call and leaves the builder
/// field untouched; only [`EmptyCommand`](BuildError::EmptyCommand) is
/// detectable as late as [`ProcessBuilder::build`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BuildError {
    /// The timeout was negative or not a finite number of seconds.
    #[error("timeout must be a finite, non-negative number of seconds, got {seconds}")]
    InvalidTimeout { seconds: f64 },
    /// Neither a prefix nor positional arguments were configured, so there
    /// is nothing to execute.
    #[error("cannot build a process with an empty prefix and no arguments")]
    EmptyCommand,
}

/// Source of bytes for the child's standard input.
///
/// A closed sum type: anything a spawner can consume is representable here
/// and nothing else is, so setting an input never fails. Reader inputs are
/// not touched until spawn time.
pub enum ProcessInput {
    /// In-memory payload, written and closed at spawn time.
    Bytes(Bytes),
    /// Lazily consumed byte stream.
    Reader(Box<dyn tokio::io::AsyncRead + Send + Unpin>),
}

impl ProcessInput {
    /// Wraps an async byte reader as a lazy input source.
    pub fn reader(reader: impl tokio::io::AsyncRead + Send + Unpin + 'static) -> Self {
        ProcessInput::Reader(Box::new(reader))
    }
}

impl std::fmt::Debug for ProcessInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessInput::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ProcessInput::Reader(_) => f.debug_tuple("Reader").finish(),
        }
    }
}

impl From<Bytes> for ProcessInput {
    fn from(bytes: Bytes) -> Self {
        ProcessInput::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ProcessInput {
    fn from(bytes: Vec<u8>) -> Self {
        ProcessInput::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for ProcessInput {
    fn from(text: String) -> Self {
        ProcessInput::Bytes(Bytes::from(text))
    }
}

impl From<&str> for ProcessInput {
    fn from(text: &str) -> Self {
        ProcessInput::Bytes(Bytes::copy_from_slice(text.as_bytes()))
    }
}

/// Prefix accepted by [`ProcessBuilder::set_prefix`]: a single token or a
/// full token sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefix(Vec<String>);

impl From<&str> for Prefix {
    fn from(token: &str) -> Self {
        Prefix(vec![token.to_string()])
    }
}

impl From<String> for Prefix {
    fn from(token: String) -> Self {
        Prefix(vec![token])
    }
}

impl From<Vec<String>> for Prefix {
    fn from(tokens: Vec<String>) -> Self {
        Prefix(tokens)
    }
}

impl From<Vec<&str>> for Prefix {
    fn from(tokens: Vec<&str>) -> Self {
        Prefix(tokens.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Prefix {
    fn from(tokens: [&str; N]) -> Self {
        Prefix(tokens.into_iter().map(str::to_string).collect())
    }
}

/// Accumulates one task's process configuration.
///
/// Created per task, mutated through chained calls, consumed once by
/// [`build`](Self::build). Not meant to be shared across threads; each
/// builder is a short-lived, task-confined object.
#[derive(Debug)]
pub struct ProcessBuilder {
    prefix: Vec<String>,
    arguments: Vec<String>,
    options: Vec<(String, String)>,
    environment: Vec<(String, Option<String>)>,
    working_directory: Option<std::path::PathBuf>,
    input: Option<ProcessInput>,
    timeout: Option<std::time::Duration>,
    capture_output: bool,
}

impl Default for ProcessBuilder {
    fn default() -> Self {
        ProcessBuilder::new()
    }
}

impl ProcessBuilder {
    pub fn new() -> Self {
        ProcessBuilder {
            prefix: Vec::new(),
            arguments: Vec::new(),
            options: Vec::new(),
            environment: Vec::new(),
            working_directory: None,
            input: None,
            timeout: Some(std::time::Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS)),
            capture_output: true,
        }
    }

    /// Starts a builder with an initial positional argument list.
    pub fn with_arguments<I>(arguments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut builder = ProcessBuilder::new();
        builder.set_arguments(arguments);
        builder
    }

    /// Appends one positional argument.
    pub fn add_argument(&mut self, argument: impl Into<String>) -> &mut Self {
        self.arguments.push(argument.into());
        self
    }

    /// Replaces all positional arguments. The prefix is untouched.
    pub fn set_arguments<I>(&mut self, arguments: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the command prefix. The prefix survives argument resets; it
    /// is the fixed leading portion of the argument vector.
    pub fn set_prefix(&mut self, prefix: impl Into<Prefix>) -> &mut Self {
        self.prefix = prefix.into().0;
        self
    }

    /// Sets the working directory; `None` inherits the caller's.
    pub fn set_working_directory(
        &mut self,
        path: Option<impl Into<std::path::PathBuf>>,
    ) -> &mut Self {
        self.working_directory = path.map(Into::into);
        self
    }

    /// Sets one environment variable in the overlay. `None` marks the
    /// variable for removal from the inherited environment rather than
    /// passing it through as an empty string.
    pub fn set_environment_variable(
        &mut self,
        name: impl Into<String>,
        value: Option<String>,
    ) -> &mut Self {
        upsert(&mut self.environment, name.into(), value);
        self
    }

    /// Merges a set of environment variables into the overlay; later keys
    /// overwrite values already set.
    pub fn merge_environment_variables<I>(&mut self, variables: I) -> &mut Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        for (name, value) in variables {
            upsert(&mut self.environment, name, value);
        }
        self
    }

    /// Sets the child's standard input source.
    pub fn set_input(&mut self, input: impl Into<ProcessInput>) -> &mut Self {
        self.input = Some(input.into());
        self
    }

    /// Clears any configured standard input source.
    pub fn clear_input(&mut self) -> &mut Self {
        self.input = None;
        self
    }

    /// Sets the timeout in seconds; `None` disables enforcement, zero is a
    /// valid boundary. Negative or non-finite values are rejected without
    /// touching the current timeout.
    pub fn set_timeout(&mut self, seconds: Option<f64>) -> Result<&mut Self, BuildError> {
        match seconds {
            None => {
                self.timeout = None;
            }
            Some(seconds) => {
                self.timeout = Some(
                    std::time::Duration::try_from_secs_f64(seconds)
                        .map_err(|_| BuildError::InvalidTimeout { seconds })?,
                );
            }
        }
        Ok(self)
    }

    /// Inserts or overwrites a named option, rendered between the prefix and
    /// the positional arguments as the two tokens `-name`, `value`.
    /// Overwriting keeps the option's original position.
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        upsert(&mut self.options, name.into(), value.into());
        self
    }

    /// Stops the spawner from retaining the child's stdout/stderr.
    pub fn disable_output_capture(&mut self) -> &mut Self {
        self.capture_output = false;
        self
    }

    pub fn enable_output_capture(&mut self) -> &mut Self {
        self.capture_output = true;
        self
    }

    /// Renders the final argument vector (`prefix ++ options ++ arguments`)
    /// and consumes the builder into an immutable descriptor.
    ///
    /// Pure with respect to the OS; nothing is spawned here.
    ///
    /// # Errors
    ///
    /// [`BuildError::EmptyCommand`] when both the prefix and the positional
    /// arguments are empty.
    pub fn build(self) -> Result<ProcessDescriptor, BuildError> {
        if self.prefix.is_empty() && self.arguments.is_empty() {
            return Err(BuildError::EmptyCommand);
        }
        let mut argv = self.prefix;
        argv.reserve(self.options.len() * 2 + self.arguments.len());
        for (name, value) in self.options {
            argv.push(format!("-{name}"));
            argv.push(value);
        }
        argv.extend(self.arguments);
        tracing::debug!("rendered argument vector: {:?}", argv);
        Ok(ProcessDescriptor {
            argv,
            working_directory: self.working_directory,
            environment: self.environment,
            input: self.input,
            timeout: self.timeout,
            capture_output: self.capture_output,
        })
    }
}

fn upsert<V>(entries: &mut Vec<(String, V)>, name: String, value: V) {
    if let Some(entry) = entries.iter_mut().find(|(existing, _)| *existing == name) {
        entry.1 = value;
    } else {
        entries.push((name, value));
    }
}

/// Immutable, fully-resolved process description produced by
/// [`ProcessBuilder::build`]. The argument vector is guaranteed non-empty.
#[derive(Debug)]
pub struct ProcessDescriptor {
    argv: Vec<String>,
    working_directory: Option<std::path::PathBuf>,
    environment: Vec<(String, Option<String>)>,
    input: Option<ProcessInput>,
    timeout: Option<std::time::Duration>,
    capture_output: bool,
}

/// A descriptor broken into its parts, for spawn capabilities that need to
/// move the input source out.
#[derive(Debug)]
pub struct DescriptorParts {
    pub argv: Vec<String>,
    pub working_directory: Option<std::path::PathBuf>,
    pub environment: Vec<(String, Option<String>)>,
    pub input: Option<ProcessInput>,
    pub timeout: Option<std::time::Duration>,
    pub capture_output: bool,
}

impl ProcessDescriptor {
    /// The full argument vector, program first.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The program token (`argv[0]`).
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program token.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn working_directory(&self) -> Option<&std::path::Path> {
        self.working_directory.as_deref()
    }

    /// Environment overlay; a `None` value means "remove from the inherited
    /// environment".
    pub fn environment(&self) -> &[(String, Option<String>)] {
        &self.environment
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout
    }

    pub fn captures_output(&self) -> bool {
        self.capture_output
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    /// Deconstructs the descriptor for spawning.
    pub fn into_parts(self) -> DescriptorParts {
        DescriptorParts {
            argv: self.argv,
            working_directory: self.working_directory,
            environment: self.environment,
            input: self.input,
            timeout: self.timeout,
            capture_output: self.capture_output,
        }
    }
}
