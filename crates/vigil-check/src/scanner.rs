//! Single-pass dispatch of checkers over a compilation unit.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, debug_span, trace};
use vigil_fix::{apply_fixes, SuggestedFix};
use vigil_query::{annotation_strings, Context};
use vigil_syntax::{NodeKind, NodeRef};
use vigil_types::ClassId;

use crate::{BugChecker, Description, ScannerSupplier, Severity, VisitorState};

const SUPPRESS_WARNINGS: &str = "java.lang.SuppressWarnings";

struct EnabledCheck {
    checker: Arc<dyn BugChecker>,
    severity: Severity,
}

/// Runs the enabled checks of a [`ScannerSupplier`] over units.
///
/// Each unit is walked once in pre-order; at every node only the checks that
/// asked for its kind are consulted, in check-name order, so the findings of
/// a scan come out in a deterministic order.
pub struct Scanner {
    checks: Vec<EnabledCheck>,
    by_kind: HashMap<NodeKind, Vec<usize>>,
    patch_checks: BTreeSet<String>,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field(
                "checks",
                &self.checks.iter().map(|c| c.checker.name()).collect::<Vec<_>>(),
            )
            .field("patch_checks", &self.patch_checks)
            .finish()
    }
}

/// Result of [`Scanner::patch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patched {
    pub text: String,
    /// Indices of the descriptions whose first fix was applied.
    pub applied: Vec<usize>,
    /// Indices of the descriptions whose first fix was rejected.
    pub rejected: Vec<usize>,
}

impl Scanner {
    pub(crate) fn new(supplier: &ScannerSupplier) -> Self {
        let mut checks = Vec::new();
        let mut by_kind: HashMap<NodeKind, Vec<usize>> = HashMap::new();
        for (checker, severity) in supplier.enabled_checks() {
            let index = checks.len();
            for &kind in checker.node_kinds() {
                let slot = by_kind.entry(kind).or_default();
                if !slot.contains(&index) {
                    slot.push(index);
                }
            }
            checks.push(EnabledCheck {
                checker: Arc::clone(checker),
                severity,
            });
        }
        Self {
            checks,
            by_kind,
            patch_checks: supplier.patch_checks().clone(),
        }
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Every finding of the enabled checks in `ctx`'s unit, in traversal
    /// order.
    pub fn scan(&self, ctx: &Context<'_>) -> Vec<Description> {
        let unit = ctx.unit();
        let _span = debug_span!(target: "vigil.check", "scan", path = unit.path()).entered();

        let state = VisitorState::new(*ctx);
        let mut out = Vec::new();
        let mut visited = 0usize;
        for node in unit.root().descendants() {
            if node.is_generated() {
                continue;
            }
            let Some(indices) = self.by_kind.get(&node.kind()) else {
                continue;
            };
            visited += 1;
            for &index in indices {
                let check = &self.checks[index];
                let found = check.checker.check(node, &state);
                for description in found.into_iter().chain(state.take_reports()) {
                    if is_suppressed(ctx, check.checker.as_ref(), &description) {
                        trace!(
                            target: "vigil.check",
                            check = check.checker.name(),
                            at = %description.line_col,
                            "suppressed"
                        );
                        continue;
                    }
                    out.push(description.apply_severity_override(check.severity));
                }
            }
        }
        debug!(
            target: "vigil.check",
            nodes = visited,
            findings = out.len(),
            "scanned unit"
        );
        out
    }

    /// Applies the first fix of each finding whose check takes part in
    /// patching to `source`.
    ///
    /// With no patch checks configured every enabled check takes part.
    /// Findings are patched in order; a fix that collides with an earlier
    /// one is rejected and the finding gets a `fix_conflict` note.
    pub fn patch(&self, source: &str, descriptions: &mut [Description]) -> Patched {
        let selected: Vec<usize> = descriptions
            .iter()
            .enumerate()
            .filter(|(_, d)| {
                self.patch_checks.is_empty() || self.patch_checks.contains(&d.check_name)
            })
            .filter(|(_, d)| d.first_fix().is_some())
            .map(|(index, _)| index)
            .collect();
        let fixes: Vec<&SuggestedFix> = selected
            .iter()
            .filter_map(|&index| descriptions[index].first_fix())
            .collect();

        let result = apply_fixes(source, fixes);

        let mut rejected = Vec::new();
        for conflict in &result.conflicts {
            let index = selected[conflict.fix];
            let other = &descriptions[selected[conflict.conflicts_with]];
            let note = format!(
                "fix conflicts with the fix for [{}] at {}",
                other.check_name, other.line_col
            );
            if !rejected.contains(&index) {
                descriptions[index].set_fix_conflict(note);
                rejected.push(index);
            }
        }
        for invalid in &result.invalid {
            let index = selected[invalid.fix];
            descriptions[index]
                .set_fix_conflict(format!("fix could not be applied: {}", invalid.error));
            rejected.push(index);
        }
        rejected.sort_unstable();

        Patched {
            text: result.text,
            applied: result.applied.iter().map(|&fix| selected[fix]).collect(),
            rejected,
        }
    }
}

/// Is the finding inside a declaration annotated `@SuppressWarnings` with the
/// check's name, one of its alternate names, or `"all"`?
fn is_suppressed(
    ctx: &Context<'_>,
    checker: &dyn BugChecker,
    description: &Description,
) -> bool {
    let info = checker.info();
    if !info.disableable {
        return false;
    }
    let Some(node) = ctx.node(description.node) else {
        return false;
    };
    let Some(suppress) = ctx.class_by_name(SUPPRESS_WARNINGS) else {
        return false;
    };
    std::iter::once(node)
        .chain(node.ancestors())
        .filter(|n| n.kind().is_declaration())
        .flat_map(|decl| decl.data().annotations().iter().map(move |&id| decl.at(id)))
        .filter(|annotation| annotation_class_is(*annotation, suppress))
        .flat_map(|annotation| annotation_strings(ctx, annotation))
        .any(|value| value == "all" || info.answers_to(&value))
}

fn annotation_class_is(annotation: NodeRef<'_>, class: ClassId) -> bool {
    annotation
        .ty()
        .and_then(|ty| ty.class_id())
        .is_some_and(|id| id == class)
}
