use pretty_assertions::assert_eq;
use vigil_bugpatterns::{builtin_checkers, builtin_supplier};
use vigil_check::{CheckOptions, Severity};
use vigil_query::CompilationContext;
use vigil_test_utils::compile;

const SOURCE: &str = r#"package p;

class Task implements Runnable {
    public void run() {
        int[] counts = new int[3];
        System.out.println(counts.toString());
        long mask = 1 << 40;
    }
}
"#;

#[test]
fn builtin_checks_have_unique_names() {
    let supplier = builtin_supplier().unwrap();
    assert_eq!(supplier.all_checks().count(), builtin_checkers().len());
    let names: Vec<&str> = supplier.all_checks().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec![
            "ArrayToString",
            "AssertEqualsArgumentOrder",
            "BadShiftAmount",
            "IdentityHashMapEquals",
            "LossyPrimitiveCompare",
            "MissingOverride",
        ]
    );
}

#[test]
fn scan_and_patch_a_unit() {
    let f = compile(SOURCE);
    let comp = CompilationContext::new(f.store());
    let scanner = builtin_supplier().unwrap().scanner();
    let mut findings = scanner.scan(&comp.context(f.unit()));

    let rendered: Vec<String> = findings.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "4:5: warning: [MissingOverride] run implements method in Runnable; \
             expected @Override",
            "6:28: error: [ArrayToString] Calling toString on an array does not provide \
             useful information",
            "7:21: error: [BadShiftAmount] A 32-bit value is shifted by 40, which is outside \
             the range 0..31",
        ]
    );

    let patched = scanner.patch(f.unit().text(), &mut findings);
    assert_eq!(
        patched.text,
        r#"package p;

import java.util.Arrays;

class Task implements Runnable {
    @Override public void run() {
        int[] counts = new int[3];
        System.out.println(Arrays.toString(counts));
        long mask = 1L << 40;
    }
}
"#
    );
    assert_eq!(patched.applied, vec![0, 1, 2]);
}

#[test]
fn options_narrow_the_builtin_set() {
    let f = compile(SOURCE);
    let comp = CompilationContext::new(f.store());
    let options = CheckOptions::from_args([
        "-Xep:MissingOverride:OFF",
        "-XepAllErrorsAsWarnings",
    ])
    .unwrap();
    let supplier = builtin_supplier().unwrap().apply_overrides(&options).unwrap();
    let findings = supplier.scanner().scan(&comp.context(f.unit()));

    let summary: Vec<(&str, Severity)> = findings
        .iter()
        .map(|d| (d.check_name.as_str(), d.severity))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ArrayToString", Severity::Warning),
            ("BadShiftAmount", Severity::Warning),
        ]
    );
}
