use pretty_assertions::assert_eq;
use vigil_fix::{apply_fixes, SuggestedFix};
use vigil_syntax::NodeKind;
use vigil_test_utils::{compile, span};

#[test]
fn rename_with_repeated_import() {
    let source = "int foo = 1;";
    let fix = SuggestedFix::builder()
        .replace_range(span(source, "foo"), "bar")
        .add_import("java.util.List")
        .add_import("java.util.List")
        .build()
        .unwrap();
    assert_eq!(fix.apply(source).unwrap(), "import java.util.List;\n\nint bar = 1;");

    let without_import = SuggestedFix::builder()
        .replace_range(span(source, "foo"), "bar")
        .build()
        .unwrap();
    assert_eq!(without_import.apply(source).unwrap(), "int bar = 1;");
}

#[test]
fn array_to_string_rewrite() {
    let source = "System.out.println(a.toString());";
    let fix = SuggestedFix::builder()
        .replace_range(span(source, "a.toString()"), "Arrays.toString(a)")
        .add_import("java.util.Arrays")
        .build()
        .unwrap();
    assert_eq!(
        fix.apply(source).unwrap(),
        "import java.util.Arrays;\n\nSystem.out.println(Arrays.toString(a));"
    );
}

#[test]
fn fixes_from_separate_findings_share_one_import() {
    let f = compile(
        r#"package p;

class Test {
    void m(int[] a, int[] b) {
        System.out.println(a.toString());
        System.out.println(b.toString());
    }
}
"#,
    );
    let fixes: Vec<SuggestedFix> = ["a", "b"]
        .iter()
        .map(|name| {
            let call = f.find(NodeKind::MethodInvocation, &format!("{name}.toString()"));
            let mut fix = SuggestedFix::builder();
            let arrays = fix.qualify_type(f.unit(), "java.util.Arrays");
            fix.replace(call, format!("{arrays}.toString({name})"));
            fix.build().unwrap()
        })
        .collect();

    let result = apply_fixes(f.unit().text(), &fixes);
    assert_eq!(result.applied, vec![0, 1]);
    assert_eq!(
        result.text,
        r#"package p;

import java.util.Arrays;

class Test {
    void m(int[] a, int[] b) {
        System.out.println(Arrays.toString(a));
        System.out.println(Arrays.toString(b));
    }
}
"#
    );
}

#[test]
fn conflicting_findings_keep_the_first() {
    let f = compile("class Test { int m(int x) { return x + 1; } }");
    let binary = f.find(NodeKind::Binary, "x + 1");
    let operand = f.find(NodeKind::Identifier, "x");

    let widen = SuggestedFix::replace(binary, "(long) x + 1").unwrap();
    let rename = SuggestedFix::replace(operand, "y").unwrap();

    let result = apply_fixes(f.unit().text(), [&widen, &rename]);
    assert_eq!(result.text, "class Test { int m(int x) { return (long) x + 1; } }");
    assert_eq!(result.applied, vec![0]);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].fix, 1);
    assert_eq!(result.conflicts[0].conflicts_with, 0);
}
