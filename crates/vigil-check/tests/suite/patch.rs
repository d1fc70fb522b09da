use std::sync::Arc;

use pretty_assertions::assert_eq;
use vigil_check::{checker, BugChecker, BugPatternInfo, CheckOptions, ScannerSupplier, Severity};
use vigil_fix::SuggestedFix;
use vigil_matchers::{int_literal, Matcher};
use vigil_query::CompilationContext;
use vigil_syntax::{NodeData, NodeKind};
use vigil_test_utils::compile;

const SOURCE: &str = "class A {\n    int m(int x) {\n        return x + 0;\n    }\n}\n";

/// `x + 0` becomes `x`.
fn add_zero() -> Arc<dyn BugChecker> {
    Arc::new(checker(
        BugPatternInfo::new("AddZero", "Adding zero", Severity::Warning),
        [NodeKind::Binary],
        |this, node, state| {
            let NodeData::Binary { lhs, rhs, .. } = node.data() else {
                return None;
            };
            if !int_literal(0).matches(node.at(*rhs), state.ctx()) {
                return None;
            }
            let fix = SuggestedFix::replace(node, node.at(*lhs).text()).ok()?;
            Some(this.describe(node).add_fix(fix).build())
        },
    ))
}

/// `0` becomes `ZERO`.
fn zero_literal() -> Arc<dyn BugChecker> {
    Arc::new(checker(
        BugPatternInfo::new("ZeroLiteral", "Zero literal", Severity::Suggestion),
        [NodeKind::Literal],
        |this, node, state| {
            if !int_literal(0).matches(node, state.ctx()) {
                return None;
            }
            let fix = SuggestedFix::replace(node, "ZERO").ok()?;
            Some(this.describe(node).add_fix(fix).build())
        },
    ))
}

fn supplier(args: &[&str]) -> ScannerSupplier {
    ScannerSupplier::from_checkers([add_zero(), zero_literal()])
        .unwrap()
        .apply_overrides(&CheckOptions::from_args(args).unwrap())
        .unwrap()
}

#[test]
fn later_overlapping_fixes_are_rejected_with_a_note() {
    let f = compile(SOURCE);
    let comp = CompilationContext::new(f.store());
    let scanner = supplier(&[]).scanner();
    let mut findings = scanner.scan(&comp.context(f.unit()));
    let names: Vec<&str> = findings.iter().map(|d| d.check_name.as_str()).collect();
    assert_eq!(names, vec!["AddZero", "ZeroLiteral"]);

    let patched = scanner.patch(f.unit().text(), &mut findings);
    assert_eq!(
        patched.text,
        "class A {\n    int m(int x) {\n        return x;\n    }\n}\n"
    );
    assert_eq!(patched.applied, vec![0]);
    assert_eq!(patched.rejected, vec![1]);
    assert_eq!(findings[0].fix_conflict(), None);
    assert_eq!(
        findings[1].fix_conflict(),
        Some("fix conflicts with the fix for [AddZero] at 3:16")
    );
    assert!(findings[1].to_string().ends_with(
        "\n  note: fix conflicts with the fix for [AddZero] at 3:16"
    ));
}

#[test]
fn only_patch_checks_take_part() {
    let f = compile(SOURCE);
    let comp = CompilationContext::new(f.store());
    let scanner = supplier(&["-XepPatchChecks:ZeroLiteral"]).scanner();
    let mut findings = scanner.scan(&comp.context(f.unit()));
    assert_eq!(findings.len(), 2);

    let patched = scanner.patch(f.unit().text(), &mut findings);
    assert_eq!(
        patched.text,
        "class A {\n    int m(int x) {\n        return x + ZERO;\n    }\n}\n"
    );
    assert_eq!(patched.applied, vec![1]);
    assert!(patched.rejected.is_empty());
    assert!(findings.iter().all(|d| d.fix_conflict().is_none()));
}

#[test]
fn findings_without_fixes_leave_the_source_alone() {
    let f = compile("class A { int m() { return 1; } }");
    let comp = CompilationContext::new(f.store());
    let scanner = supplier(&[]).scanner();
    let mut findings = scanner.scan(&comp.context(f.unit()));
    assert!(findings.is_empty());

    let patched = scanner.patch(f.unit().text(), &mut findings);
    assert_eq!(patched.text, f.unit().text());
    assert!(patched.applied.is_empty());
}
