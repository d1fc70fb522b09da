use std::sync::Arc;

use pretty_assertions::assert_eq;
use vigil_check::{
    checker, BugChecker, BugPatternInfo, CheckOptions, Description, ScannerSupplier, Severity,
};
use vigil_matchers::{int_literal, Matcher};
use vigil_query::CompilationContext;
use vigil_syntax::{NodeData, NodeKind};
use vigil_test_utils::{compile, JavaFixture};

fn zero_literal(info: BugPatternInfo) -> Arc<dyn BugChecker> {
    Arc::new(checker(info, [NodeKind::Literal], |this, node, state| {
        int_literal(0)
            .matches(node, state.ctx())
            .then(|| this.describe(node).build())
    }))
}

fn report_every(name: &str, kinds: &[NodeKind]) -> Arc<dyn BugChecker> {
    Arc::new(checker(
        BugPatternInfo::new(name, "seen", Severity::Suggestion),
        kinds.iter().copied(),
        |this, node, _state| Some(this.describe(node).build()),
    ))
}

fn scan(fixture: &JavaFixture, supplier: &ScannerSupplier) -> Vec<Description> {
    let comp = CompilationContext::new(fixture.store());
    supplier.scanner().scan(&comp.context(fixture.unit()))
}

fn texts(fixture: &JavaFixture, findings: &[Description]) -> Vec<String> {
    findings
        .iter()
        .map(|d| format!("{}@{}", d.check_name, &fixture.unit().text()[d.range]))
        .collect()
}

#[test]
fn nodes_fan_out_to_interested_checks_in_preorder() {
    let f = compile("class A { int x = 1; void m() { int y = 2; } }");
    let supplier = ScannerSupplier::from_checkers([
        report_every("Beta", &[NodeKind::Literal, NodeKind::Method]),
        report_every("Alpha", &[NodeKind::Literal]),
    ])
    .unwrap();

    let findings = scan(&f, &supplier);
    assert_eq!(
        texts(&f, &findings),
        vec![
            "Alpha@1",
            "Beta@1",
            "Beta@void m() { int y = 2; }",
            "Alpha@2",
            "Beta@2",
        ]
    );
}

#[test]
fn generated_nodes_are_not_visited() {
    let f = compile("class A { void m() {} }");
    let supplier = ScannerSupplier::from_checkers([report_every("Methods", &[NodeKind::Method])])
        .unwrap();

    let findings = scan(&f, &supplier);
    assert_eq!(texts(&f, &findings), vec!["Methods@void m() {}"]);
}

const SUPPRESSED: &str = r#"
class Test {
    int a = 0;
    @SuppressWarnings("ZeroLiteral") int b = 0;
    @SuppressWarnings("zero") int c = 0;
    @SuppressWarnings("all") int d = 0;
    @SuppressWarnings("unchecked") int e = 0;
    @SuppressWarnings({"unchecked", "ZeroLiteral"})
    void m() { int f = 0; }
    void n() { int g = 0; }
}
"#;

#[test]
fn suppress_warnings_by_name_alt_name_or_all() {
    let f = compile(SUPPRESSED);
    let info = BugPatternInfo::new("ZeroLiteral", "Zero literal", Severity::Warning)
        .with_alt_names(["zero"]);
    let supplier = ScannerSupplier::from_checkers([zero_literal(info)]).unwrap();

    let findings = scan(&f, &supplier);
    let lines: Vec<usize> = findings.iter().map(|d| d.line_col.line as usize + 1).collect();
    // `a`, `e` and `g`.
    assert_eq!(lines, vec![3, 7, 10]);
}

#[test]
fn pinned_checks_ignore_suppression() {
    let f = compile(SUPPRESSED);
    let info = BugPatternInfo::new("ZeroLiteral", "Zero literal", Severity::Error)
        .with_alt_names(["zero"])
        .not_disableable();
    let supplier = ScannerSupplier::from_checkers([zero_literal(info)]).unwrap();

    assert_eq!(scan(&f, &supplier).len(), 7);
}

#[test]
fn findings_carry_the_effective_severity() {
    let f = compile("class A { int a = 0; }");
    let supplier = ScannerSupplier::from_checkers([zero_literal(BugPatternInfo::new(
        "ZeroLiteral",
        "Zero literal",
        Severity::Suggestion,
    ))])
    .unwrap();

    assert_eq!(scan(&f, &supplier)[0].severity, Severity::Suggestion);

    let options = CheckOptions::from_args(["-Xep:ZeroLiteral:ERROR"]).unwrap();
    let promoted = supplier.apply_overrides(&options).unwrap();
    let findings = scan(&f, &promoted);
    assert_eq!(findings[0].severity, Severity::Error);
    assert!(findings[0].to_string().starts_with("1:19: error: [ZeroLiteral]"));

    let options = CheckOptions::from_args(["-Xep:ZeroLiteral:OFF"]).unwrap();
    let off = supplier.apply_overrides(&options).unwrap();
    assert_eq!(off.scanner().check_count(), 0);
    assert!(scan(&f, &off).is_empty());
}

#[test]
fn checks_may_report_several_findings_per_node() {
    let f = compile("class A { void m(int a, String b) {} void n() {} }");
    let per_param = checker(
        BugPatternInfo::new("Params", "parameter", Severity::Suggestion),
        [NodeKind::Method],
        |this, node, state| {
            let NodeData::Method { params, .. } = node.data() else {
                return None;
            };
            for &param in params {
                state.report(this.describe(node.at(param)).build());
            }
            (!params.is_empty()).then(|| {
                this.describe(node)
                    .set_message(format!("{} parameters", params.len()))
                    .build()
            })
        },
    );
    let checks: [Arc<dyn BugChecker>; 1] = [Arc::new(per_param)];
    let supplier = ScannerSupplier::from_checkers(checks).unwrap();

    let findings = scan(&f, &supplier);
    assert_eq!(
        texts(&f, &findings),
        vec![
            "Params@void m(int a, String b) {}",
            "Params@int a",
            "Params@String b",
        ]
    );
    assert_eq!(findings[0].message(), "[Params] 2 parameters");
    assert_eq!(findings[1].message(), "[Params] parameter");
}
