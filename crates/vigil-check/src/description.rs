//! Findings reported by checkers.

use std::fmt;

use vigil_core::{LineCol, TextRange};
use vigil_fix::SuggestedFix;
use vigil_syntax::{NodeId, NodeRef};

use crate::{BugPatternInfo, Severity};

/// One finding: where, what, and the fixes proposed for it, most preferred
/// first. A finding without fixes is still a finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Description {
    pub check_name: String,
    pub node: NodeId,
    pub range: TextRange,
    pub line_col: LineCol,
    pub severity: Severity,
    raw_message: String,
    link: Option<String>,
    fixes: Vec<SuggestedFix>,
    fix_conflict: Option<String>,
}

impl Description {
    /// Starts a finding at `node` with the pattern's summary as message.
    pub fn builder(node: NodeRef<'_>, info: &BugPatternInfo) -> DescriptionBuilder {
        DescriptionBuilder {
            check_name: info.name.clone(),
            node: node.id(),
            range: node.range(),
            line_col: node.unit().line_index().line_col(node.range().start()),
            severity: info.severity,
            raw_message: info.summary.clone(),
            link: info.link.clone(),
            fixes: Vec::new(),
        }
    }

    /// `[Name] message`, followed by the link on its own line when there is
    /// one.
    pub fn message(&self) -> String {
        format!("[{}] {}", self.check_name, self.message_without_check_name())
    }

    pub fn message_without_check_name(&self) -> String {
        match &self.link {
            Some(link) if !link.is_empty() => format!("{}\n  (see {link})", self.raw_message),
            _ => self.raw_message.clone(),
        }
    }

    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn fixes(&self) -> &[SuggestedFix] {
        &self.fixes
    }

    pub fn first_fix(&self) -> Option<&SuggestedFix> {
        self.fixes.first()
    }

    /// Set when patching could not apply this finding's fix.
    pub fn fix_conflict(&self) -> Option<&str> {
        self.fix_conflict.as_deref()
    }

    pub(crate) fn set_fix_conflict(&mut self, note: String) {
        self.fix_conflict = Some(note);
    }

    #[must_use]
    pub fn apply_severity_override(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn filter_fixes(mut self, keep: impl FnMut(&SuggestedFix) -> bool) -> Self {
        self.fixes.retain(keep);
        self
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.line_col, self.severity, self.message())?;
        if let Some(note) = &self.fix_conflict {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct DescriptionBuilder {
    check_name: String,
    node: NodeId,
    range: TextRange,
    line_col: LineCol,
    severity: Severity,
    raw_message: String,
    link: Option<String>,
    fixes: Vec<SuggestedFix>,
}

impl DescriptionBuilder {
    /// Replaces the summary with a message specific to this finding.
    pub fn set_message(mut self, message: impl Into<String>) -> Self {
        self.raw_message = message.into();
        self
    }

    /// Adds a fix; empty fixes are dropped.
    pub fn add_fix(mut self, fix: SuggestedFix) -> Self {
        if !fix.is_empty() {
            self.fixes.push(fix);
        }
        self
    }

    pub fn add_all_fixes(self, fixes: impl IntoIterator<Item = SuggestedFix>) -> Self {
        fixes.into_iter().fold(self, Self::add_fix)
    }

    pub fn build(self) -> Description {
        Description {
            check_name: self.check_name,
            node: self.node,
            range: self.range,
            line_col: self.line_col,
            severity: self.severity,
            raw_message: self.raw_message,
            link: self.link,
            fixes: self.fixes,
            fix_conflict: None,
        }
    }
}
