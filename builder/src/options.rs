//! Insertion-ordered option collections and their argv token rendering.

/// A single command-line option: a bare flag when `name` is absent, a named
/// flag otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub name: Option<String>,
    pub value: String,
}

impl OptionEntry {
    pub fn flag(value: impl Into<String>) -> Self {
        OptionEntry {
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        OptionEntry {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

/// An ordered sequence of option entries.
///
/// Insertion order is preserved all the way into the rendered argument
/// vector. The real binaries resolve duplicated options last-wins, so the
/// order entries were declared in is part of the contract, not an accident
/// of storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: Vec<OptionEntry>,
}

impl OptionSet {
    pub fn new() -> Self {
        OptionSet::default()
    }

    /// Appends a bare flag, rendered as the single token `-value`.
    pub fn push_flag(&mut self, value: impl Into<String>) {
        self.entries.push(OptionEntry::flag(value));
    }

    /// Appends a named flag, rendered as the two tokens `-name`, `value`.
    pub fn push_named(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(OptionEntry::named(name, value));
    }

    /// Chaining variant of [`push_flag`](Self::push_flag) for literals.
    #[must_use]
    pub fn with_flag(mut self, value: impl Into<String>) -> Self {
        self.push_flag(value);
        self
    }

    /// Chaining variant of [`push_named`](Self::push_named) for literals.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_named(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }
}

impl FromIterator<OptionEntry> for OptionSet {
    fn from_iter<I: IntoIterator<Item = OptionEntry>>(iter: I) -> Self {
        OptionSet {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Renders generic options: one `-value` token per bare entry, two tokens
/// `-name`, `value` per named entry. Never a single concatenated
/// `-name value` token, which a shell-unaware spawner would pass through as
/// one argument the binary cannot split.
pub fn option_tokens(options: &OptionSet) -> Vec<String> {
    let mut tokens = Vec::new();
    for entry in options.entries() {
        match &entry.name {
            Some(name) => {
                tokens.push(format!("-{name}"));
                tokens.push(entry.value.clone());
            }
            None => tokens.push(format!("-{}", entry.value)),
        }
    }
    tokens
}

/// Renders ssh protocol options: every entry yields the two tokens `-o`,
/// `name=value` (or just the value after `-o` for a bare entry). This is a
/// distinct syntax from generic flags and must never be folded into the
/// generic rendering path.
pub fn ssh_option_tokens(options: &OptionSet) -> Vec<String> {
    let mut tokens = Vec::new();
    for entry in options.entries() {
        tokens.push("-o".to_string());
        match &entry.name {
            Some(name) => tokens.push(format!("{}={}", name, entry.value)),
            None => tokens.push(entry.value.clone()),
        }
    }
    tokens
}
