use std::collections::BTreeSet;

use tracing::{debug, warn};
use vigil_core::{
    apply_text_edits, normalize_text_edits, ranges_conflict, EditError, TextEdit, TextRange,
};

use crate::imports::resolve_import_edits;
use crate::{ImportChange, SuggestedFix};

/// A fix that was not applied because one of its edits overlaps an edit of a
/// fix accepted earlier. One entry per conflicting pair of edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixConflict {
    /// Index of the rejected fix.
    pub fix: usize,
    /// Index of the accepted fix it collided with.
    pub conflicts_with: usize,
    /// The rejected fix's edit range.
    pub range: TextRange,
    /// The accepted fix's edit range.
    pub other: TextRange,
}

/// A fix whose edits do not fit the source at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFix {
    pub fix: usize,
    pub error: EditError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFixes {
    pub text: String,
    /// Indices of the fixes whose edits are in `text`, in order.
    pub applied: Vec<usize>,
    pub conflicts: Vec<FixConflict>,
    pub invalid: Vec<InvalidFix>,
}

impl AppliedFixes {
    pub fn is_applied(&self, fix: usize) -> bool {
        self.applied.contains(&fix)
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Applies `fixes` to `source`, first come first served.
///
/// Fixes are considered in iteration order. A fix is accepted when none of
/// its edits overlaps an edit of an already accepted fix; an edit identical to
/// an accepted one is not an overlap. A rejected fix contributes nothing, not
/// even its imports, and every colliding pair is reported. Import changes of
/// the accepted fixes are pooled: an addition requested by several fixes
/// produces one import line, and an addition wins over a removal of the same
/// import.
pub fn apply_fixes<'a>(
    source: &str,
    fixes: impl IntoIterator<Item = &'a SuggestedFix>,
) -> AppliedFixes {
    let mut accepted: Vec<(usize, &TextEdit)> = Vec::new();
    let mut imports: BTreeSet<ImportChange> = BTreeSet::new();
    let mut applied = Vec::new();
    let mut conflicts = Vec::new();
    let mut invalid = Vec::new();

    for (index, fix) in fixes.into_iter().enumerate() {
        let mut own = fix.edits().to_vec();
        if let Err(error) = normalize_text_edits(source, &mut own) {
            warn!(target: "vigil.fix", fix = index, %error, "fix does not fit the source");
            invalid.push(InvalidFix { fix: index, error });
            continue;
        }

        let mut clashes = Vec::new();
        for edit in fix.edits() {
            for &(owner, taken) in &accepted {
                if taken != edit && ranges_conflict(taken.range, edit.range) {
                    clashes.push(FixConflict {
                        fix: index,
                        conflicts_with: owner,
                        range: edit.range,
                        other: taken.range,
                    });
                }
            }
        }
        if !clashes.is_empty() {
            for clash in &clashes {
                warn!(
                    target: "vigil.fix",
                    fix = clash.fix,
                    conflicts_with = clash.conflicts_with,
                    range = ?clash.range,
                    other = ?clash.other,
                    "rejecting conflicting fix"
                );
            }
            conflicts.extend(clashes);
            continue;
        }

        accepted.extend(fix.edits().iter().map(|edit| (index, edit)));
        imports.extend(fix.imports().cloned());
        applied.push(index);
    }

    // Import edits go first so that an insertion at the same offset as a fix
    // edit lands ahead of it.
    let mut edits: Vec<TextEdit> = Vec::with_capacity(accepted.len());
    for edit in resolve_import_edits(source, &imports) {
        match accepted.iter().find(|(_, e)| ranges_conflict(e.range, edit.range)) {
            Some((_, blocking)) => warn!(
                target: "vigil.fix",
                range = ?edit.range,
                blocking = ?blocking.range,
                "dropping import change that overlaps a fix edit"
            ),
            None => edits.push(edit),
        }
    }
    edits.extend(accepted.iter().map(|(_, edit)| (*edit).clone()));

    match apply_text_edits(source, &edits) {
        Ok(text) => {
            debug!(
                target: "vigil.fix",
                applied = applied.len(),
                conflicts = conflicts.len(),
                invalid = invalid.len(),
                "applied fixes"
            );
            AppliedFixes {
                text,
                applied,
                conflicts,
                invalid,
            }
        }
        Err(error) => {
            // Accepted edits were checked pairwise; reaching this means the
            // set as a whole does not fit, so nothing is applied.
            warn!(target: "vigil.fix", %error, "could not apply accepted fixes");
            invalid.extend(applied.drain(..).map(|fix| InvalidFix {
                fix,
                error: error.clone(),
            }));
            AppliedFixes {
                text: source.to_string(),
                applied,
                conflicts,
                invalid,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vigil_core::TextSize;
    use vigil_test_utils::{capture_logs, events_for};

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    fn replace(start: u32, end: u32, text: &str) -> SuggestedFix {
        SuggestedFix::builder()
            .replace_range(range(start, end), text)
            .build()
            .unwrap()
    }

    #[test]
    fn later_conflicting_fix_is_rejected_whole() {
        let source = "abcdefghij";
        let first = replace(0, 5, "X");
        let second = SuggestedFix::builder()
            .replace_range(range(3, 6), "Y")
            .replace_range(range(8, 9), "Z")
            .build()
            .unwrap();
        let third = replace(6, 8, "W");

        let (result, logs) = capture_logs(|| apply_fixes(source, [&first, &second, &third]));
        assert_eq!(result.text, "XfWij");
        assert_eq!(result.applied, vec![0, 2]);
        assert_eq!(
            result.conflicts,
            vec![FixConflict {
                fix: 1,
                conflicts_with: 0,
                range: range(3, 6),
                other: range(0, 5),
            }]
        );
        assert!(result.is_applied(2) && !result.is_applied(1));

        let warnings = events_for(&logs, "vigil.fix");
        assert!(warnings
            .iter()
            .any(|e| e.message() == Some("rejecting conflicting fix")
                && e.field("fix") == Some("1")));
    }

    #[test]
    fn touching_and_identical_edits_are_not_conflicts() {
        let source = "0123456789";
        let fixes = [replace(0, 5, "a"), replace(5, 8, "b"), replace(0, 5, "a")];
        let result = apply_fixes(source, &fixes);
        assert_eq!(result.text, "ab89");
        assert_eq!(result.applied, vec![0, 1, 2]);
        assert!(!result.has_conflicts());
    }

    #[test]
    fn insertions_at_one_offset_follow_fix_order() {
        let source = "f(x)";
        let first = SuggestedFix::builder()
            .replace_offsets(2, 2, "a, ")
            .build()
            .unwrap();
        let second = SuggestedFix::builder()
            .replace_offsets(2, 2, "b, ")
            .build()
            .unwrap();
        assert_eq!(apply_fixes(source, [&first, &second]).text, "f(a, b, x)");
        assert_eq!(apply_fixes(source, [&second, &first]).text, "f(b, a, x)");
    }

    #[test]
    fn out_of_bounds_fix_is_reported_not_fatal() {
        let source = "short";
        let fixes = [replace(2, 40, "x"), replace(0, 1, "S")];
        let result = apply_fixes(source, &fixes);
        assert_eq!(result.text, "Short");
        assert_eq!(result.applied, vec![1]);
        assert_eq!(
            result.invalid,
            vec![InvalidFix {
                fix: 0,
                error: EditError::RangeOutOfBounds {
                    range: range(2, 40),
                    text_len: TextSize::from(5),
                },
            }]
        );
        assert!(fixes[0].apply(source).is_err());
    }

    #[test]
    fn imports_are_pooled_across_fixes() {
        let source = "import java.util.Set;\n\nclass A {}\n";
        let first = SuggestedFix::builder()
            .add_import("java.util.List")
            .build()
            .unwrap();
        let second = SuggestedFix::builder()
            .add_import("java.util.List")
            .remove_import("java.util.Set")
            .build()
            .unwrap();
        let third = SuggestedFix::builder()
            .add_import("java.util.Set")
            .build()
            .unwrap();

        let result = apply_fixes(source, [&first, &second]);
        assert_eq!(result.text, "import java.util.List;\n\nclass A {}\n");

        let result = apply_fixes(source, [&first, &second, &third]);
        assert_eq!(
            result.text,
            "import java.util.Set;\nimport java.util.List;\n\nclass A {}\n"
        );
    }

    #[test]
    fn imports_precede_an_insertion_at_the_top_of_the_file() {
        let source = "class A {}\n";
        let fix = SuggestedFix::builder()
            .replace_offsets(0, 0, "@Deprecated\n")
            .add_import("java.util.List")
            .build()
            .unwrap();
        assert_eq!(
            apply_fixes(source, [&fix]).text,
            "import java.util.List;\n\n@Deprecated\nclass A {}\n"
        );

        let source = "package p;\n\nimport java.util.Set;\nclass A {}\n";
        let offset = source.find("class").unwrap();
        let fix = SuggestedFix::builder()
            .replace_offsets(offset, offset, "@Deprecated\n")
            .add_import("java.util.List")
            .build()
            .unwrap();
        assert_eq!(
            apply_fixes(source, [&fix]).text,
            "package p;\n\nimport java.util.Set;\nimport java.util.List;\n@Deprecated\nclass A {}\n"
        );
    }

    #[test]
    fn rejected_fix_brings_no_imports() {
        let source = "class A { int x; }";
        let first = replace(10, 16, "long y;");
        let second = SuggestedFix::builder()
            .replace_range(range(10, 13), "List<String>")
            .add_import("java.util.List")
            .build()
            .unwrap();
        let result = apply_fixes(source, [&first, &second]);
        assert_eq!(result.text, "class A { long y; }");
        assert_eq!(result.conflicts.len(), 1);
    }
}
