use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        })
    }
}

/// Static metadata of one bug pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BugPatternInfo {
    /// Canonical name, as used in `-Xep:` flags and `[Name]` message prefixes.
    pub name: String,
    pub summary: String,
    pub severity: Severity,
    pub link: Option<String>,
    /// Other names `@SuppressWarnings` accepts for this pattern.
    pub alt_names: Vec<String>,
    pub disableable: bool,
    pub enabled_by_default: bool,
}

impl BugPatternInfo {
    pub fn new(name: impl Into<String>, summary: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
            severity,
            link: None,
            alt_names: Vec::new(),
            disableable: true,
            enabled_by_default: true,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_alt_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alt_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn not_disableable(mut self) -> Self {
        self.disableable = false;
        self
    }

    pub fn disabled_by_default(mut self) -> Self {
        self.enabled_by_default = false;
        self
    }

    /// Is `name` the canonical name or one of the alternate names?
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.alt_names.iter().any(|alt| alt == name)
    }
}
